//! Common types and time utilities
//!
//! Shared type aliases and the timestamp conversions used when turning
//! human-readable event bounds into `ingested_at` filters.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Sort Order
// ============================================================================

/// Sort order accepted by the transactions query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    /// Newest ingestion first (the only order the crawler uses)
    #[default]
    IngestedAtDesc,
    /// Oldest ingestion first
    IngestedAtAsc,
    /// Newest block first
    HeightDesc,
    /// Oldest block first
    HeightAsc,
}

impl SortOrder {
    /// Wire representation of the sort order constant
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::IngestedAtDesc => "INGESTED_AT_DESC",
            SortOrder::IngestedAtAsc => "INGESTED_AT_ASC",
            SortOrder::HeightDesc => "HEIGHT_DESC",
            SortOrder::HeightAsc => "HEIGHT_ASC",
        }
    }
}

// ============================================================================
// Time conversions
// ============================================================================

/// Convert a unix timestamp (seconds) to a UTC datetime.
///
/// Out-of-range timestamps return None rather than panicking.
pub fn timestamp_to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0).single()
}

/// Convert a datetime to a unix timestamp (seconds)
pub fn datetime_to_timestamp(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// Parse a `"YYYY-MM-DD HH:MM:SS"` string as a UTC datetime
pub fn parse_utc(time_str: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(time_str, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| Error::validation(format!("invalid time '{time_str}': {e}")))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Parse a `"YYYY-MM-DD HH:MM:SS"` string straight to a unix timestamp
pub fn parse_utc_timestamp(time_str: &str) -> Result<i64> {
    Ok(parse_utc(time_str)?.timestamp())
}
