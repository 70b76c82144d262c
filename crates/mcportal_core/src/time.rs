//! Wall-clock timestamps for MCPortal.
//!
//! Timestamps are UTC and render as RFC 3339 with a fixed microsecond
//! precision, so the string form sorts in chronological order.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Offset-free ISO-8601 date-time, fractional seconds optional
const NAIVE_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Wall clock timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Get the current time, truncated to microseconds
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    /// Parse an RFC 3339 string, or an ISO-8601 date-time without an
    /// offset, which is read as UTC
    ///
    /// # Errors
    ///
    /// Returns error if the string is neither form
    pub fn parse(s: &str) -> CoreResult<Self> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .or_else(|rfc_err| {
                NaiveDateTime::parse_from_str(s, NAIVE_ISO_FORMAT)
                    .map(|naive| Self(naive.and_utc()))
                    .map_err(|_| CoreError::InvalidTimestamp {
                        reason: format!("{}: {}", s, rfc_err),
                    })
            })
    }

    /// Render as RFC 3339 with microsecond precision
    #[must_use]
    pub fn to_iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Seconds elapsed since `earlier`; negative if `earlier` is later
    #[must_use]
    pub fn seconds_since(&self, earlier: &Timestamp) -> f64 {
        let delta = self.0.signed_duration_since(earlier.0);
        delta.num_microseconds().map_or_else(
            || delta.num_milliseconds() as f64 / 1_000.0,
            |micros| micros as f64 / 1_000_000.0,
        )
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_iso_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let ts = Timestamp(dt);
        assert_eq!(ts.to_iso(), "2024-03-01T12:30:05.000000Z");
    }

    #[test]
    fn test_timestamp_parse_roundtrip() {
        let ts = Timestamp::now();
        let parsed = Timestamp::parse(&ts.to_iso()).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_timestamp_parse_offset() {
        let ts = Timestamp::parse("2024-03-01T14:30:05+02:00").unwrap();
        assert_eq!(ts.to_iso(), "2024-03-01T12:30:05.000000Z");
    }

    #[test]
    fn test_timestamp_parse_without_offset() {
        let ts = Timestamp::parse("2024-06-01T12:00:00.123456").unwrap();
        assert_eq!(ts.to_iso(), "2024-06-01T12:00:00.123456Z");
        let ts = Timestamp::parse("2024-06-01T12:00:00").unwrap();
        assert_eq!(ts.to_iso(), "2024-06-01T12:00:00.000000Z");
        assert!(Timestamp::parse("2024-06-01").is_err());
    }

    #[test]
    fn test_timestamp_parse_invalid() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_seconds_since() {
        let t1 = Timestamp::parse("2024-03-01T12:00:00.500000Z").unwrap();
        let t2 = Timestamp::parse("2024-03-01T12:00:02.250000Z").unwrap();
        assert!((t2.seconds_since(&t1) - 1.75).abs() < 1e-9);
        assert!(t1.seconds_since(&t2) < 0.0);
    }

    #[test]
    fn test_lexical_order_matches_chronological() {
        let early = Timestamp::parse("2024-03-01T09:59:59.999999Z").unwrap();
        let late = Timestamp::parse("2024-03-01T10:00:00Z").unwrap();
        assert!(early < late);
        assert!(early.to_iso() < late.to_iso());
    }

    #[test]
    fn test_timestamp_serde() {
        let ts = Timestamp::parse("2024-03-01T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-03-01T12:00:00.000000Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
