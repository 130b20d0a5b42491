//! The read path of the metric engine.

use std::collections::BTreeMap;

use futures::{StreamExt, TryStreamExt};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utapi_common::time::{interval_range, EpochMillis};
use utapi_redis::{Command, Datastore, Reply, ScoreBound};

use crate::schema::{self, AbsoluteMetric, Granularity, Resource, INCOMING_BYTES, OUTGOING_BYTES};
use crate::Operation;

/// Default bound on concurrently queried resources.
pub const DEFAULT_LIST_CONCURRENCY: usize = 5;

/// The queried time range, in epoch milliseconds.
///
/// Serializes as the two-element array `[start, end]` used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range, inclusive.
    pub start: EpochMillis,
    /// End of the range, exclusive for deltas and inclusive for the
    /// absolute lookups.
    pub end: EpochMillis,
}

impl TimeRange {
    /// Creates a range from raw millisecond bounds.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start: EpochMillis::from_millis(start),
            end: EpochMillis::from_millis(end),
        }
    }
}

impl Serialize for TimeRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.start)?;
        seq.serialize_element(&self.end)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let [start, end] = <[u64; 2]>::deserialize(deserializer)?;
        Ok(Self::new(start, end))
    }
}

/// An error returned by [`ListMetrics::list`].
#[derive(Debug, Error)]
pub enum ListError {
    /// A store batch failed as a whole; details have been logged.
    #[error("internal error")]
    Internal,
}

/// The resource identifier of a metrics record, keyed by family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceName {
    /// A bucket-level record.
    Bucket {
        /// Name of the bucket.
        #[serde(rename = "bucketName")]
        bucket_name: String,
    },
    /// An account-level record.
    Account {
        /// Canonical id of the account.
        #[serde(rename = "accountId")]
        account_id: String,
    },
    /// The service-level record.
    Service {
        /// Name of the service component.
        #[serde(rename = "serviceName")]
        service_name: String,
    },
}

impl ResourceName {
    fn new(granularity: Granularity, id: &str) -> Self {
        match granularity {
            Granularity::Bucket => Self::Bucket {
                bucket_name: id.to_owned(),
            },
            Granularity::Account => Self::Account {
                account_id: id.to_owned(),
            },
            Granularity::Service => Self::Service {
                service_name: id.to_owned(),
            },
        }
    }
}

/// The metrics of one resource over a queried time range.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    /// The resource the record belongs to.
    #[serde(flatten)]
    pub resource: ResourceName,
    /// The queried range, echoed exactly as received.
    pub time_range: TimeRange,
    /// Sampled storage level at range start and end.
    pub storage_utilized: [i64; 2],
    /// Bytes received within the range.
    pub incoming_bytes: i64,
    /// Bytes sent within the range.
    pub outgoing_bytes: i64,
    /// Sampled object count at range start and end.
    pub number_of_objects: [i64; 2],
    /// Operation counts within the range, keyed by API name.
    pub operations: BTreeMap<&'static str, i64>,
}

impl ResourceMetrics {
    fn empty(granularity: Granularity, id: &str, time_range: TimeRange) -> Self {
        Self {
            resource: ResourceName::new(granularity, id),
            time_range,
            storage_utilized: [0, 0],
            incoming_bytes: 0,
            outgoing_bytes: 0,
            number_of_objects: [0, 0],
            operations: Operation::ALL
                .iter()
                .map(|operation| (operation.api_name(), 0))
                .collect(),
        }
    }
}

/// Every delta metric queried per interval: all operation counters plus the
/// two traffic metrics.
fn delta_metrics() -> impl Iterator<Item = &'static str> {
    Operation::ALL
        .iter()
        .map(|operation| operation.storage_name())
        .chain([INCOMING_BYTES, OUTGOING_BYTES])
}

/// Answers `ListMetrics` queries for one resource family.
#[derive(Clone, Debug)]
pub struct ListMetrics {
    granularity: Granularity,
    datastore: Datastore,
    concurrency: usize,
}

impl ListMetrics {
    /// Creates a lister for `granularity` on top of `datastore`.
    pub fn new(granularity: Granularity, datastore: Datastore) -> Self {
        Self {
            granularity,
            datastore,
            concurrency: DEFAULT_LIST_CONCURRENCY,
        }
    }

    /// Bounds the number of concurrently queried resources.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Computes one metrics record per resource, in request order.
    pub async fn list(
        &self,
        resources: &[String],
        range: TimeRange,
    ) -> Result<Vec<ResourceMetrics>, ListError> {
        futures::stream::iter(resources.to_vec())
            .map(|resource| async move { self.list_one(&resource, range).await })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Issues the single pipelined batch for one resource and folds the
    /// replies into its metrics record.
    async fn list_one(&self, id: &str, range: TimeRange) -> Result<ResourceMetrics, ListError> {
        let resource = Resource {
            granularity: self.granularity,
            id,
        };

        // One `get` per interval boundary per delta metric. Keys normalize
        // the boundary onto its interval, so an unaligned range start still
        // matches the keys written at ingest.
        let boundaries = interval_range(range.start, range.end);
        let mut commands =
            Vec::with_capacity(boundaries.len() * delta_metrics().count() + 4);
        for boundary in &boundaries {
            for metric in delta_metrics() {
                commands.push(Command::get(schema::generate_key(
                    &resource, metric, *boundary,
                )));
            }
        }
        let delta_count = commands.len();

        // Four nearest-predecessor lookups resolve the absolutes at the raw
        // range endpoints.
        for metric in AbsoluteMetric::ALL {
            for endpoint in [range.start, range.end] {
                commands.push(Command::zrevrangebyscore(
                    schema::generate_state_key(&resource, metric),
                    ScoreBound::Value(endpoint.as_millis()),
                    ScoreBound::NegInf,
                    Some((0, 1)),
                ));
            }
        }

        let results = self.datastore.batch(&commands).await.map_err(|error| {
            utapi_log::error!(
                resource = id,
                error = &error as &dyn std::error::Error,
                "failed to execute metrics query batch"
            );
            ListError::Internal
        })?;

        if results.len() != commands.len() {
            utapi_log::error!(resource = id, "metrics query batch returned a short reply");
            return Err(ListError::Internal);
        }

        let mut metrics = ResourceMetrics::empty(self.granularity, id, range);

        for (command, result) in commands.iter().take(delta_count).zip(&results) {
            let value = self.delta_value(command, result);
            match schema::metric_from_key(command.key(), &resource) {
                Some(INCOMING_BYTES) => metrics.incoming_bytes += value,
                Some(OUTGOING_BYTES) => metrics.outgoing_bytes += value,
                Some(metric) => {
                    if let Ok(operation) = metric.parse::<Operation>() {
                        if let Some(count) = metrics.operations.get_mut(operation.api_name()) {
                            *count += value;
                        }
                    }
                }
                None => {}
            }
        }

        let mut absolutes = results[delta_count..]
            .iter()
            .zip(&commands[delta_count..])
            .map(|(result, command)| self.absolute_value(command, result));

        metrics.storage_utilized = [
            absolutes.next().unwrap_or_default(),
            absolutes.next().unwrap_or_default(),
        ];
        metrics.number_of_objects = [
            absolutes.next().unwrap_or_default(),
            absolutes.next().unwrap_or_default(),
        ];

        Ok(metrics)
    }

    /// Parses a delta reply, treating absent values and failed commands as
    /// zero.
    fn delta_value(&self, command: &Command, result: &Result<Reply, utapi_redis::StoreError>) -> i64 {
        match result {
            Ok(Reply::Data(data)) => data.parse().unwrap_or(0),
            Ok(_) => 0,
            Err(error) => {
                utapi_log::warn!(
                    key = command.key(),
                    error = error as &dyn std::error::Error,
                    "metric read failed, defaulting to zero"
                );
                0
            }
        }
    }

    /// Parses a nearest-predecessor reply, clamping negatives to zero.
    fn absolute_value(
        &self,
        command: &Command,
        result: &Result<Reply, utapi_redis::StoreError>,
    ) -> i64 {
        match result {
            Ok(reply) => reply
                .members()
                .first()
                .and_then(|member| member.parse::<i64>().ok())
                .unwrap_or(0)
                .max(0),
            Err(error) => {
                utapi_log::warn!(
                    key = command.key(),
                    error = error as &dyn std::error::Error,
                    "state read failed, defaulting to zero"
                );
                0
            }
        }
    }
}
