//! The write path of the metric engine.

use thiserror::Error;
use utapi_common::time::{Clock, EpochMillis};
use utapi_redis::{Command, Datastore, Reply, ScoreBound};

use crate::schema::{self, AbsoluteMetric, Granularity, Resource, INCOMING_BYTES, OUTGOING_BYTES};
use crate::{MetricEvent, Operation};

/// An error returned by [`UtapiClient::push_metric`].
#[derive(Debug, Error)]
pub enum PushError {
    /// The event is missing a numeric property its operation requires.
    ///
    /// Raised before any store I/O.
    #[error("event for {operation} is missing required property {property}")]
    MissingProperty {
        /// Storage name of the rejected operation.
        operation: &'static str,
        /// Name of the missing property.
        property: &'static str,
    },

    /// The store batch failed; details have been logged.
    #[error("internal error")]
    Internal,
}

/// The numeric payload of an event, extracted per write algorithm.
///
/// Each variant corresponds to one of the write algorithms below, so that
/// required-property checks complete before the first store call.
#[derive(Clone, Copy, Debug)]
enum Payload {
    Generic { outgoing: Option<i64> },
    CreateBucket,
    UploadPart { bytes: i64 },
    CompleteUpload,
    Put { delta: i64, new_object: bool, incoming: Option<i64> },
    Delete { bytes: i64, objects: i64 },
}

impl Payload {
    fn extract(event: &MetricEvent) -> Result<Self, PushError> {
        let operation = event.operation;

        match operation {
            Operation::CreateBucket => Ok(Self::CreateBucket),
            Operation::CompleteMultipartUpload => Ok(Self::CompleteUpload),
            Operation::UploadPart => Ok(Self::UploadPart {
                bytes: required(event.new_byte_length, operation, "newByteLength")?,
            }),
            Operation::PutObject | Operation::CopyObject => {
                let new = required(event.new_byte_length, operation, "newByteLength")?;
                let old = event.old_byte_length.map(|bytes| bytes as i64);

                Ok(Self::Put {
                    delta: new - old.unwrap_or(0),
                    new_object: old.is_none(),
                    incoming: (operation == Operation::PutObject).then_some(new),
                })
            }
            Operation::DeleteObject | Operation::MultiObjectDelete => Ok(Self::Delete {
                bytes: required(event.byte_length, operation, "byteLength")?,
                objects: required(event.number_of_objects, operation, "numberOfObjects")?,
            }),
            Operation::GetObject => Ok(Self::Generic {
                outgoing: Some(required(event.new_byte_length, operation, "newByteLength")?),
            }),
            _ => Ok(Self::Generic { outgoing: None }),
        }
    }
}

fn required(
    value: Option<u64>,
    operation: Operation,
    property: &'static str,
) -> Result<i64, PushError> {
    match value {
        Some(value) => Ok(value as i64),
        None => Err(PushError::MissingProperty {
            operation: operation.storage_name(),
            property,
        }),
    }
}

fn integer(reply: &Reply) -> i64 {
    match reply {
        Reply::Int(value) => *value,
        Reply::Data(data) => data.parse().unwrap_or(0),
        _ => 0,
    }
}

/// The client ingesting storage events into the metric space.
///
/// Constructed once at startup and shared by reference; all mutable state
/// lives in the backing store. Without a configured datastore the client is
/// disabled: pushes succeed without side effects.
#[derive(Clone, Debug)]
pub struct UtapiClient {
    datastore: Option<Datastore>,
    component: String,
    granularities: Vec<Granularity>,
    clock: Clock,
}

impl UtapiClient {
    /// Creates a new client for `component`.
    ///
    /// `granularities` restricts the levels at which events are recorded;
    /// `None` records every level an event carries.
    pub fn new(
        datastore: Option<Datastore>,
        component: impl Into<String>,
        granularities: Option<Vec<Granularity>>,
    ) -> Self {
        Self {
            datastore,
            component: component.into(),
            granularities: granularities.unwrap_or_else(|| Granularity::ALL.to_vec()),
            clock: Clock::System,
        }
    }

    /// Replaces the clock used to attribute events to intervals.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Records `event` at every enabled granularity it carries.
    ///
    /// The event is attributed to the interval containing "now". Failures of
    /// the underlying batches are logged and reported as one opaque
    /// [`PushError::Internal`]; the client never retries.
    pub async fn push_metric(&self, event: &MetricEvent) -> Result<(), PushError> {
        let payload = Payload::extract(event)?;

        let Some(datastore) = &self.datastore else {
            utapi_log::debug!(
                operation = %event.operation,
                "datastore not configured, dropping metric"
            );
            return Ok(());
        };

        utapi_log::debug!(
            operation = %event.operation,
            request_id = event.request_id.as_deref().unwrap_or("-"),
            "pushing metric"
        );

        let timestamp = self.clock.now();
        for resource in self.targets(event) {
            self.apply(datastore, &resource, event.operation, payload, timestamp)
                .await?;
        }

        Ok(())
    }

    /// Fans the event out into one resource per enabled granularity.
    fn targets<'a>(&'a self, event: &'a MetricEvent) -> Vec<Resource<'a>> {
        self.granularities
            .iter()
            .filter_map(|&granularity| {
                let id = match granularity {
                    Granularity::Bucket => event.bucket.as_deref(),
                    Granularity::Account => event.account_id.as_deref(),
                    Granularity::Service => Some(self.component.as_str()),
                };

                id.map(|id| Resource { granularity, id })
            })
            .collect()
    }

    async fn apply(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        payload: Payload,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        match payload {
            Payload::Generic { outgoing } => {
                self.push_generic(datastore, resource, operation, outgoing, timestamp)
                    .await
            }
            Payload::CreateBucket => {
                self.push_create_bucket(datastore, resource, operation, timestamp)
                    .await
            }
            Payload::UploadPart { bytes } => {
                self.push_upload_part(datastore, resource, operation, bytes, timestamp)
                    .await
            }
            Payload::CompleteUpload => {
                self.push_complete_upload(datastore, resource, operation, timestamp)
                    .await
            }
            Payload::Put {
                delta,
                new_object,
                incoming,
            } => {
                self.push_put(
                    datastore, resource, operation, delta, new_object, incoming, timestamp,
                )
                .await
            }
            Payload::Delete { bytes, objects } => {
                self.push_delete(datastore, resource, operation, bytes, objects, timestamp)
                    .await
            }
        }
    }

    /// Bumps the operation counter, and for reads the outgoing traffic.
    async fn push_generic(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        outgoing: Option<i64>,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let mut commands = Vec::with_capacity(2);
        if let Some(bytes) = outgoing {
            commands.push(Command::incrby(
                schema::generate_key(resource, OUTGOING_BYTES, timestamp),
                bytes,
            ));
        }
        commands.push(Command::incr(schema::generate_key(
            resource,
            operation.storage_name(),
            timestamp,
        )));

        self.run_batch(datastore, operation, &commands).await?;
        Ok(())
    }

    /// Establishes the start of the resource timeline.
    ///
    /// Both running counters are reset to zero and zero-valued samples are
    /// written at the current interval. At bucket granularity the operation
    /// counter is set rather than incremented.
    async fn push_create_bucket(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let score = timestamp.interval_start().as_millis();

        let mut commands = Vec::with_capacity(7);
        for metric in AbsoluteMetric::ALL {
            commands.push(Command::set(schema::generate_counter(resource, metric), 0));
        }
        for metric in AbsoluteMetric::ALL {
            let key = schema::generate_state_key(resource, metric);
            commands.push(Command::zremrangebyscore(
                key.clone(),
                ScoreBound::Value(score),
                ScoreBound::Value(score),
            ));
            commands.push(Command::zadd(key, score, "0"));
        }

        let operation_key = schema::generate_key(resource, operation.storage_name(), timestamp);
        commands.push(match resource.granularity {
            Granularity::Bucket => Command::set(operation_key, 1),
            Granularity::Account | Granularity::Service => Command::incr(operation_key),
        });

        self.run_batch(datastore, operation, &commands).await?;
        Ok(())
    }

    async fn push_upload_part(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        bytes: i64,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let commands = [
            Command::incrby(
                schema::generate_counter(resource, AbsoluteMetric::StorageUtilized),
                bytes,
            ),
            Command::incrby(
                schema::generate_key(resource, INCOMING_BYTES, timestamp),
                bytes,
            ),
            Command::incr(schema::generate_key(
                resource,
                operation.storage_name(),
                timestamp,
            )),
        ];

        let replies = self.run_batch(datastore, operation, &commands).await?;
        let storage = integer(&replies[0]);

        self.sample(
            datastore,
            resource,
            operation,
            &[(AbsoluteMetric::StorageUtilized, storage)],
            timestamp,
        )
        .await
    }

    async fn push_complete_upload(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let commands = [
            Command::incr(schema::generate_counter(
                resource,
                AbsoluteMetric::NumberOfObjects,
            )),
            Command::incr(schema::generate_key(
                resource,
                operation.storage_name(),
                timestamp,
            )),
        ];

        let replies = self.run_batch(datastore, operation, &commands).await?;
        let objects = integer(&replies[0]);

        self.sample(
            datastore,
            resource,
            operation,
            &[(AbsoluteMetric::NumberOfObjects, objects)],
            timestamp,
        )
        .await
    }

    /// Applies a put or copy.
    ///
    /// An overwrite leaves the object count untouched; its current value is
    /// read in the same batch so the re-sample stays consistent with the
    /// counter updates of this write.
    #[allow(clippy::too_many_arguments)]
    async fn push_put(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        delta: i64,
        new_object: bool,
        incoming: Option<i64>,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let storage_counter = schema::generate_counter(resource, AbsoluteMetric::StorageUtilized);
        let objects_counter = schema::generate_counter(resource, AbsoluteMetric::NumberOfObjects);

        let mut commands = Vec::with_capacity(4);
        commands.push(Command::incrby(storage_counter, delta));
        commands.push(match new_object {
            true => Command::incr(objects_counter),
            false => Command::get(objects_counter),
        });
        if let Some(bytes) = incoming {
            commands.push(Command::incrby(
                schema::generate_key(resource, INCOMING_BYTES, timestamp),
                bytes,
            ));
        }
        commands.push(Command::incr(schema::generate_key(
            resource,
            operation.storage_name(),
            timestamp,
        )));

        let replies = self.run_batch(datastore, operation, &commands).await?;
        let storage = integer(&replies[0]);
        let objects = integer(&replies[1]);

        self.sample(
            datastore,
            resource,
            operation,
            &[
                (AbsoluteMetric::StorageUtilized, storage),
                (AbsoluteMetric::NumberOfObjects, objects),
            ],
            timestamp,
        )
        .await
    }

    /// Applies a delete of `objects` objects totalling `bytes`.
    ///
    /// The counters may transiently go negative when deletes race ahead of
    /// the corresponding puts; they are left as-is and only the written
    /// samples are clamped.
    async fn push_delete(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        bytes: i64,
        objects: i64,
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let commands = [
            Command::decrby(
                schema::generate_counter(resource, AbsoluteMetric::StorageUtilized),
                bytes,
            ),
            Command::decrby(
                schema::generate_counter(resource, AbsoluteMetric::NumberOfObjects),
                objects,
            ),
            Command::incr(schema::generate_key(
                resource,
                operation.storage_name(),
                timestamp,
            )),
        ];

        let replies = self.run_batch(datastore, operation, &commands).await?;
        let storage = integer(&replies[0]);
        let remaining = integer(&replies[1]);

        self.sample(
            datastore,
            resource,
            operation,
            &[
                (AbsoluteMetric::StorageUtilized, storage),
                (AbsoluteMetric::NumberOfObjects, remaining),
            ],
            timestamp,
        )
        .await
    }

    /// Re-samples absolute values into their state sets at the current
    /// interval.
    ///
    /// Remove-then-add runs as one pipelined pair per metric, so exactly one
    /// sample survives per interval and readers never observe the interval
    /// empty once a writer completed.
    async fn sample(
        &self,
        datastore: &Datastore,
        resource: &Resource<'_>,
        operation: Operation,
        samples: &[(AbsoluteMetric, i64)],
        timestamp: EpochMillis,
    ) -> Result<(), PushError> {
        let score = timestamp.interval_start().as_millis();

        let mut commands = Vec::with_capacity(samples.len() * 2);
        for &(metric, value) in samples {
            let key = schema::generate_state_key(resource, metric);
            commands.push(Command::zremrangebyscore(
                key.clone(),
                ScoreBound::Value(score),
                ScoreBound::Value(score),
            ));
            commands.push(Command::zadd(key, score, value.max(0).to_string()));
        }

        self.run_batch(datastore, operation, &commands).await?;
        Ok(())
    }

    /// Executes a batch and fails the push on any error within it.
    async fn run_batch(
        &self,
        datastore: &Datastore,
        operation: Operation,
        commands: &[Command],
    ) -> Result<Vec<Reply>, PushError> {
        let results = datastore.batch(commands).await.map_err(|error| {
            utapi_log::error!(
                operation = %operation,
                error = &error as &dyn std::error::Error,
                "failed to execute metric batch"
            );
            PushError::Internal
        })?;

        if results.len() != commands.len() {
            utapi_log::error!(operation = %operation, "metric batch returned a short reply");
            return Err(PushError::Internal);
        }

        let mut replies = Vec::with_capacity(results.len());
        let mut failed = false;
        for (command, result) in commands.iter().zip(results) {
            match result {
                Ok(reply) => replies.push(reply),
                Err(error) => {
                    utapi_log::error!(
                        operation = %operation,
                        key = command.key(),
                        error = &error as &dyn std::error::Error,
                        "metric batch command failed"
                    );
                    failed = true;
                }
            }
        }

        if failed {
            return Err(PushError::Internal);
        }

        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use utapi_redis::Reply;

    use super::*;

    // 2017-07-14T02:30:00Z, interval aligned
    const T0: u64 = 1_499_999_400_000;

    fn client(datastore: &Datastore) -> UtapiClient {
        UtapiClient::new(Some(datastore.clone()), "s3", None).with_clock(Clock::fixed(T0))
    }

    async fn int_at(datastore: &Datastore, key: &str) -> i64 {
        match datastore.get(key).await.unwrap() {
            Reply::Data(data) => data.parse().unwrap(),
            Reply::Nil => 0,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    async fn sample_at(datastore: &Datastore, key: &str, score: u64) -> Option<String> {
        let reply = datastore
            .zrangebyscore(key, ScoreBound::Value(score), ScoreBound::Value(score))
            .await
            .unwrap();
        reply.members().first().cloned()
    }

    #[tokio::test]
    async fn test_missing_property_is_synchronous() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::PutObject).with_bucket("b");
        let error = client.push_metric(&event).await.unwrap_err();
        assert!(matches!(
            error,
            PushError::MissingProperty {
                property: "newByteLength",
                ..
            }
        ));

        // Nothing was written.
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:putObject:{T0}")).await,
            0
        );
    }

    #[tokio::test]
    async fn test_disabled_client_is_a_noop() {
        let client = UtapiClient::new(None, "s3", None);

        let event = MetricEvent::new(Operation::ListBucket).with_bucket("b");
        client.push_metric(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_client_still_validates() {
        let client = UtapiClient::new(None, "s3", None);

        let event = MetricEvent::new(Operation::DeleteObject).with_bucket("b");
        assert!(client.push_metric(&event).await.is_err());
    }

    #[tokio::test]
    async fn test_create_bucket_initializes_timeline() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::CreateBucket)
            .with_bucket("b")
            .with_account_id("a1");
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            0
        );
        assert_eq!(
            int_at(&datastore, "buckets:b:counter:numberOfObjects").await,
            0
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:storageUtilized", T0).await,
            Some("0".to_owned())
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:numberOfObjects", T0).await,
            Some("0".to_owned())
        );

        // Operation counter is set at bucket level, incremented elsewhere.
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:createBucket:{T0}")).await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("accounts:a1:createBucket:{T0}")).await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("service:s3:createBucket:{T0}")).await,
            1
        );
    }

    #[tokio::test]
    async fn test_put_object_new() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::PutObject)
            .with_bucket("b")
            .with_new_byte_length(100);
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            100
        );
        assert_eq!(
            int_at(&datastore, "buckets:b:counter:numberOfObjects").await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:incomingBytes:{T0}")).await,
            100
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:storageUtilized", T0).await,
            Some("100".to_owned())
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:numberOfObjects", T0).await,
            Some("1".to_owned())
        );
    }

    #[tokio::test]
    async fn test_put_object_overwrite() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let put = MetricEvent::new(Operation::PutObject)
            .with_bucket("b")
            .with_new_byte_length(100);
        client.push_metric(&put).await.unwrap();

        let overwrite = MetricEvent::new(Operation::PutObject)
            .with_bucket("b")
            .with_new_byte_length(150)
            .with_old_byte_length(100);
        client.push_metric(&overwrite).await.unwrap();

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            150
        );
        assert_eq!(
            int_at(&datastore, "buckets:b:counter:numberOfObjects").await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:incomingBytes:{T0}")).await,
            250
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:putObject:{T0}")).await,
            2
        );
    }

    #[tokio::test]
    async fn test_copy_object_has_no_incoming_traffic() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::CopyObject)
            .with_bucket("b")
            .with_new_byte_length(64);
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            64
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:incomingBytes:{T0}")).await,
            0
        );
    }

    #[tokio::test]
    async fn test_get_object_counts_outgoing_traffic() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::GetObject)
            .with_bucket("b")
            .with_new_byte_length(2048);
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, &format!("buckets:b:outgoingBytes:{T0}")).await,
            2048
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:getObject:{T0}")).await,
            1
        );
    }

    #[tokio::test]
    async fn test_delete_clamps_sample_not_counter() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::DeleteObject)
            .with_bucket("b")
            .with_byte_length(100)
            .with_number_of_objects(1);
        client.push_metric(&event).await.unwrap();

        // The counter goes negative, the sample does not.
        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            -100
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:storageUtilized", T0).await,
            Some("0".to_owned())
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:numberOfObjects", T0).await,
            Some("0".to_owned())
        );
    }

    #[tokio::test]
    async fn test_upload_part_five_times() {
        let datastore = Datastore::memory();
        let client = client(&datastore);
        let mib = 1024 * 1024;

        for _ in 0..5 {
            let event = MetricEvent::new(Operation::UploadPart)
                .with_bucket("b")
                .with_new_byte_length(mib);
            client.push_metric(&event).await.unwrap();
        }

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:storageUtilized").await,
            5 * mib as i64
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:incomingBytes:{T0}")).await,
            5 * mib as i64
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:uploadPart:{T0}")).await,
            5
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:storageUtilized", T0).await,
            Some((5 * mib).to_string())
        );
    }

    #[tokio::test]
    async fn test_complete_upload_counts_object() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::CompleteMultipartUpload).with_bucket("b");
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, "buckets:b:counter:numberOfObjects").await,
            1
        );
        assert_eq!(
            sample_at(&datastore, "buckets:b:state:numberOfObjects", T0).await,
            Some("1".to_owned())
        );
    }

    #[tokio::test]
    async fn test_restricted_granularities_skip_other_levels() {
        let datastore = Datastore::memory();
        let client =
            UtapiClient::new(Some(datastore.clone()), "s3", Some(vec![Granularity::Account]))
                .with_clock(Clock::fixed(T0));

        let event = MetricEvent::new(Operation::ListBucket)
            .with_bucket("b")
            .with_account_id("a1");
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, &format!("accounts:a1:listBucket:{T0}")).await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("buckets:b:listBucket:{T0}")).await,
            0
        );
        assert_eq!(
            int_at(&datastore, &format!("service:s3:listBucket:{T0}")).await,
            0
        );
    }

    #[tokio::test]
    async fn test_event_without_bucket_skips_bucket_level() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        let event = MetricEvent::new(Operation::ListBucket).with_account_id("a1");
        client.push_metric(&event).await.unwrap();

        assert_eq!(
            int_at(&datastore, &format!("accounts:a1:listBucket:{T0}")).await,
            1
        );
        assert_eq!(
            int_at(&datastore, &format!("service:s3:listBucket:{T0}")).await,
            1
        );
    }

    #[tokio::test]
    async fn test_same_interval_resampling_keeps_one_sample() {
        let datastore = Datastore::memory();
        let client = client(&datastore);

        for bytes in [500, 500] {
            let event = MetricEvent::new(Operation::PutObject)
                .with_bucket("b")
                .with_new_byte_length(bytes);
            client.push_metric(&event).await.unwrap();
        }

        let reply = datastore
            .zrangebyscore(
                "buckets:b:state:storageUtilized",
                ScoreBound::NegInf,
                ScoreBound::PosInf,
            )
            .await
            .unwrap();
        assert_eq!(reply.members(), ["1000".to_owned()]);

        assert_eq!(
            int_at(&datastore, &format!("buckets:b:putObject:{T0}")).await,
            2
        );
    }
}
