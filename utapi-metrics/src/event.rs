use crate::Operation;

/// A storage event to be accounted by
/// [`UtapiClient::push_metric`](crate::UtapiClient::push_metric).
///
/// Only the identifiers and numeric fields the operation actually needs have
/// to be set; the write path rejects events missing a required field before
/// touching the store. `old_byte_length` distinguishes an overwrite
/// (`Some`) from a put of a new object (`None`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricEvent {
    /// The operation that occurred.
    pub operation: Operation,
    /// Request id of the originating S3 request, for log correlation.
    pub request_id: Option<String>,
    /// Bucket the event applies to.
    pub bucket: Option<String>,
    /// Canonical id of the account the event applies to.
    pub account_id: Option<String>,
    /// Size in bytes of deleted data.
    pub byte_length: Option<u64>,
    /// Size in bytes of the object written or read.
    pub new_byte_length: Option<u64>,
    /// Previous size of an overwritten object.
    pub old_byte_length: Option<u64>,
    /// Number of objects removed by a delete.
    pub number_of_objects: Option<u64>,
}

impl MetricEvent {
    /// Creates an event for `operation` with no payload.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            request_id: None,
            bucket: None,
            account_id: None,
            byte_length: None,
            new_byte_length: None,
            old_byte_length: None,
            number_of_objects: None,
        }
    }

    /// Sets the request id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the bucket name.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the canonical account id.
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Sets the deleted byte count.
    pub fn with_byte_length(mut self, bytes: u64) -> Self {
        self.byte_length = Some(bytes);
        self
    }

    /// Sets the written or read byte count.
    pub fn with_new_byte_length(mut self, bytes: u64) -> Self {
        self.new_byte_length = Some(bytes);
        self
    }

    /// Sets the previous size of an overwritten object.
    pub fn with_old_byte_length(mut self, bytes: u64) -> Self {
        self.old_byte_length = Some(bytes);
        self
    }

    /// Sets the number of deleted objects.
    pub fn with_number_of_objects(mut self, count: u64) -> Self {
        self.number_of_objects = Some(count);
        self
    }
}
