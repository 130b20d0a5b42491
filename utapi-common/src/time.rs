//! Utilities to deal with the 15-minute accounting intervals all metrics are
//! bucketed into.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Length of one accounting interval.
pub const INTERVAL_MINUTES: i64 = 15;

/// A timestamp in milliseconds elapsed since 1970, always UTC.
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct EpochMillis(u64);

impl EpochMillis {
    /// Creates a timestamp from the given number of milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from the given system time.
    pub fn from_system(time: SystemTime) -> Self {
        let duration = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        Self(duration.as_millis() as u64)
    }

    /// Returns the current timestamp.
    #[inline]
    pub fn now() -> Self {
        Self::from_system(SystemTime::now())
    }

    /// Returns the number of milliseconds since the UNIX epoch start.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns the start of the accounting interval containing this
    /// timestamp, that is the minute of the hour floored to a multiple of 15
    /// with seconds and milliseconds zeroed.
    pub fn interval_start(self) -> Self {
        let dt = self.as_datetime();
        let excess = Duration::minutes((dt.minute() % INTERVAL_MINUTES as u32) as i64)
            + Duration::seconds(dt.second() as i64)
            + Duration::milliseconds(dt.timestamp_subsec_millis() as i64);

        Self::from_datetime(dt - excess)
    }

    fn as_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0 as i64)
            .single()
            .unwrap_or_default()
    }

    fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis() as u64)
    }
}

impl fmt::Debug for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpochMillis({})", self.as_millis())
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_millis().fmt(f)
    }
}

impl Serialize for EpochMillis {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for EpochMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Self::from_millis(millis))
    }
}

/// Enumerates the interval boundaries of a query range.
///
/// Starting at `start`, boundaries advance in calendar steps of 15 minutes
/// and include every value strictly less than `end`. A zero-length range
/// produces no boundaries.
pub fn interval_range(start: EpochMillis, end: EpochMillis) -> Vec<EpochMillis> {
    let mut boundaries = Vec::new();
    let mut current = start.as_datetime();
    let end = end.as_datetime();

    while current < end {
        boundaries.push(EpochMillis::from_datetime(current));
        current += Duration::minutes(INTERVAL_MINUTES);
    }

    boundaries
}

/// Source of "now" for the write path.
///
/// Production code uses the system clock; tests and replay tooling pin a
/// fixed timestamp to target a known interval.
#[derive(Clone, Copy, Debug, Default)]
pub enum Clock {
    /// Reads the system clock on every call.
    #[default]
    System,
    /// Always reports the given timestamp.
    Fixed(EpochMillis),
}

impl Clock {
    /// Creates a clock pinned to `millis`.
    pub fn fixed(millis: u64) -> Self {
        Self::Fixed(EpochMillis::from_millis(millis))
    }

    /// Returns the current timestamp according to this clock.
    pub fn now(&self) -> EpochMillis {
        match self {
            Self::System => EpochMillis::now(),
            Self::Fixed(timestamp) => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2017-07-14T02:30:00Z
    const ALIGNED: u64 = 1_499_999_400_000;

    #[test]
    fn test_interval_start_aligned() {
        let ts = EpochMillis::from_millis(ALIGNED);
        assert_eq!(ts.interval_start(), ts);
    }

    #[test]
    fn test_interval_start_floors() {
        // 07 minutes and change past the boundary
        let ts = EpochMillis::from_millis(ALIGNED + 7 * 60_000 + 23_456);
        assert_eq!(ts.interval_start().as_millis(), ALIGNED);
    }

    #[test]
    fn test_interval_range_aligned() {
        let start = EpochMillis::from_millis(ALIGNED);
        let end = EpochMillis::from_millis(ALIGNED + 30 * 60_000);

        let range = interval_range(start, end);
        assert_eq!(
            range,
            vec![
                EpochMillis::from_millis(ALIGNED),
                EpochMillis::from_millis(ALIGNED + 15 * 60_000),
            ]
        );
    }

    #[test]
    fn test_interval_range_excludes_end() {
        let start = EpochMillis::from_millis(ALIGNED);
        let end = EpochMillis::from_millis(ALIGNED + 15 * 60_000);

        assert_eq!(interval_range(start, end), vec![start]);
    }

    #[test]
    fn test_interval_range_unaligned_start() {
        let start = EpochMillis::from_millis(ALIGNED + 7 * 60_000);
        let end = EpochMillis::from_millis(ALIGNED + 31 * 60_000);

        let range = interval_range(start, end);
        assert_eq!(
            range,
            vec![
                EpochMillis::from_millis(ALIGNED + 7 * 60_000),
                EpochMillis::from_millis(ALIGNED + 22 * 60_000),
            ]
        );
    }

    #[test]
    fn test_interval_range_zero_length() {
        let start = EpochMillis::from_millis(ALIGNED + 7 * 60_000);
        assert!(interval_range(start, start).is_empty());
    }

    #[test]
    fn test_interval_range_one_day() {
        let start = EpochMillis::from_millis(ALIGNED);
        let end = EpochMillis::from_millis(ALIGNED + (24 * 60 + 15) * 60_000);

        assert_eq!(interval_range(start, end).len(), 97);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = Clock::fixed(ALIGNED);
        assert_eq!(clock.now().as_millis(), ALIGNED);
    }
}
