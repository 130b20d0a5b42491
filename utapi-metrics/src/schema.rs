//! Derivation of backing-store keys.
//!
//! Keys are the stable on-disk format of the engine: any key written by one
//! release must remain readable by the next. All shapes share the resource
//! tag `{level}:{id}`:
//!
//! - `{level}:{id}:{metric}:{interval}` for interval-scoped delta counters,
//! - `{level}:{id}:counter:{metric}` for the running absolute counters,
//! - `{level}:{id}:state:{metric}` for the sampled absolute timelines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utapi_common::time::EpochMillis;

/// Name of the `incomingBytes` traffic metric.
pub const INCOMING_BYTES: &str = "incomingBytes";

/// Name of the `outgoingBytes` traffic metric.
pub const OUTGOING_BYTES: &str = "outgoingBytes";

/// The level at which an event is accounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Per-bucket accounting.
    Bucket,
    /// Per-account accounting.
    Account,
    /// Service-wide accounting under the configured component name.
    Service,
}

impl Granularity {
    /// All granularities, in key-tag order.
    pub const ALL: [Granularity; 3] = [
        Granularity::Bucket,
        Granularity::Account,
        Granularity::Service,
    ];

    /// The tag used both in store keys and in request routes.
    pub fn tag(self) -> &'static str {
        match self {
            Granularity::Bucket => "buckets",
            Granularity::Account => "accounts",
            Granularity::Service => "service",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An error parsing a [`Granularity`] from its tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseGranularityError;

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|granularity| granularity.tag() == s)
            .copied()
            .ok_or(ParseGranularityError)
    }
}

/// One of the two absolute metrics carrying a running counter and a sampled
/// timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbsoluteMetric {
    /// Total bytes stored on the resource.
    StorageUtilized,
    /// Total number of objects on the resource.
    NumberOfObjects,
}

impl AbsoluteMetric {
    /// Both absolute metrics.
    pub const ALL: [AbsoluteMetric; 2] =
        [AbsoluteMetric::StorageUtilized, AbsoluteMetric::NumberOfObjects];

    /// The name under which this metric is keyed in the backing store.
    pub fn storage_name(self) -> &'static str {
        match self {
            AbsoluteMetric::StorageUtilized => "storageUtilized",
            AbsoluteMetric::NumberOfObjects => "numberOfObjects",
        }
    }
}

/// A resource within one granularity, borrowed from an event or request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resource<'a> {
    /// The level this resource lives at.
    pub granularity: Granularity,
    /// The resource identifier: bucket name, canonical account id, or the
    /// component name for service-level accounting.
    pub id: &'a str,
}

impl Resource<'_> {
    fn tag(&self) -> String {
        format!("{}:{}", self.granularity.tag(), self.id)
    }
}

/// Returns the delta key for `metric` on `resource` at the interval
/// containing `timestamp`.
pub fn generate_key(resource: &Resource<'_>, metric: &str, timestamp: EpochMillis) -> String {
    format!(
        "{}:{}:{}",
        resource.tag(),
        metric,
        timestamp.interval_start()
    )
}

/// Returns the state-set key holding the sampled timeline of `metric` on
/// `resource`.
pub fn generate_state_key(resource: &Resource<'_>, metric: AbsoluteMetric) -> String {
    format!("{}:state:{}", resource.tag(), metric.storage_name())
}

/// Returns the running-counter key of `metric` on `resource`.
pub fn generate_counter(resource: &Resource<'_>, metric: AbsoluteMetric) -> String {
    format!("{}:counter:{}", resource.tag(), metric.storage_name())
}

/// Returns all running-counter keys of `resource`.
pub fn counters(resource: &Resource<'_>) -> [String; 2] {
    [
        generate_counter(resource, AbsoluteMetric::StorageUtilized),
        generate_counter(resource, AbsoluteMetric::NumberOfObjects),
    ]
}

/// Recovers the metric name from a delta key of `resource`.
///
/// Returns `None` if the key does not belong to the resource or is not a
/// delta key.
pub fn metric_from_key<'a>(key: &'a str, resource: &Resource<'_>) -> Option<&'a str> {
    let suffix = key.strip_prefix(&format!("{}:", resource.tag()))?;
    let (metric, interval) = suffix.split_once(':')?;

    // Counter and state keys carry no interval suffix.
    interval.parse::<u64>().ok()?;
    Some(metric)
}
