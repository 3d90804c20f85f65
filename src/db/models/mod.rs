//! Database models split into domain-specific modules.

pub mod exercise;
pub mod weight;
pub mod workout;

pub use exercise::*;
pub use weight::*;
pub use workout::*;

use chrono::{DateTime, Timelike, Utc};
use sqlx::{sqlite::SqliteRow, Row};

/// Storage format for every timestamp column. Fixed width, so text order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Stored text is only ordered for four-digit years
pub const MAX_STORED_YEAR: i32 = 9999;

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Drop sub-millisecond precision; stored timestamps carry milliseconds only.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.nanosecond() / 1_000_000 * 1_000_000;
    ts.with_nanosecond(nanos).unwrap_or(ts)
}

pub(crate) fn timestamp_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    parse_timestamp(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn optional_timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| {
        parse_timestamp(&s).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip_keeps_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 45, 0).unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2024-01-15T10:45:00.000Z");
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_text_order_is_time_order() {
        let a = Utc.with_ymd_and_hms(2024, 1, 15, 9, 59, 59).unwrap();
        let b = a + chrono::Duration::milliseconds(1);
        let c = a + chrono::Duration::seconds(1);
        assert!(format_timestamp(&a) < format_timestamp(&b));
        assert!(format_timestamp(&b) < format_timestamp(&c));
    }

    #[test]
    fn test_truncate_to_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let truncated = truncate_to_millis(ts);
        assert_eq!(truncated.nanosecond(), 123_000_000);
    }
}
