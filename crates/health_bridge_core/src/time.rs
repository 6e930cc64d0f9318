//! Time ranges, buckets and boundary timestamp parsing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::HealthError;

/// Half-open interval `[start, end)` in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse a range from two ISO-8601 timestamps.
    pub fn parse(start: &str, end: &str) -> Result<Self, HealthError> {
        Ok(Self::new(
            parse_timestamp("startDate", start)?,
            parse_timestamp("endDate", end)?,
        ))
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Closed-interval membership, used for samples recorded at the very end
    /// of a session.
    pub fn contains_inclusive(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// Parse an RFC 3339 timestamp (fractional seconds and offsets accepted).
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, HealthError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HealthError::invalid(format!("{field}: '{value}' is not an ISO-8601 timestamp ({e})")))
}

/// Grouping granularity for aggregate queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Hour,
    Day,
    Week,
}

impl Bucket {
    pub fn period(self) -> Duration {
        match self {
            Bucket::Hour => Duration::hours(1),
            Bucket::Day => Duration::days(1),
            Bucket::Week => Duration::weeks(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Hour => "hour",
            Bucket::Day => "day",
            Bucket::Week => "week",
        }
    }
}

impl FromStr for Bucket {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Bucket::Hour),
            "day" => Ok(Bucket::Day),
            "week" => Ok(Bucket::Week),
            other => Err(HealthError::UnsupportedBucket(other.to_string())),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_fractional_seconds_and_offsets() {
        let r = TimeRange::parse("2025-03-01T00:00:00.000Z", "2025-03-02T02:00:00+02:00")
            .expect("range");
        assert_eq!(r.end - r.start, Duration::days(1));
    }

    #[test]
    fn parse_rejects_garbage_as_invalid_parameters() {
        let err = TimeRange::parse("yesterday", "2025-03-02T00:00:00Z").unwrap_err();
        assert!(matches!(err, HealthError::InvalidParameters(ref m) if m.starts_with("startDate")));
    }

    #[test]
    fn bucket_names() {
        assert_eq!("week".parse::<Bucket>().unwrap(), Bucket::Week);
        assert_eq!(Bucket::Hour.period(), Duration::hours(1));
        assert!(matches!(
            "month".parse::<Bucket>(),
            Err(HealthError::UnsupportedBucket(ref b)) if b == "month"
        ));
    }

    #[test]
    fn range_membership() {
        let r = TimeRange::parse("2025-03-01T10:00:00Z", "2025-03-01T11:00:00Z").unwrap();
        assert!(r.contains(r.start));
        assert!(!r.contains(r.end));
        assert!(r.contains_inclusive(r.end));
        assert!(r.overlaps(r.start - Duration::minutes(5), r.start + Duration::minutes(1)));
        assert!(!r.overlaps(r.end, r.end + Duration::minutes(1)));
    }
}
