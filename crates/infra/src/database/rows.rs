//! Shared row-mapping helpers for the SQLite repositories.
//!
//! Mapping happens inside the driver's error channel; repositories convert
//! to domain errors once at the edge.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;

/// Conversion failure for a column holding an unknown enum spelling or a
/// malformed value.
pub(crate) fn bad_column(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

/// Convert a stored unix timestamp into a UTC datetime.
pub(crate) fn datetime_column(index: usize, ts: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| bad_column(index, format!("timestamp {ts} out of range")))
}

/// Parse a stored ISO date (YYYY-MM-DD).
pub(crate) fn date_column(index: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|err| bad_column(index, format!("invalid date {raw:?}: {err}")))
}

/// Parse a stored enum spelling. The column is written exclusively by this
/// application, so an unknown spelling indicates corruption and fails the
/// read.
pub(crate) fn enum_column<T>(
    index: usize,
    parser: fn(&str) -> Option<T>,
    raw: &str,
) -> rusqlite::Result<T> {
    parser(raw).ok_or_else(|| bad_column(index, format!("unknown value in storage: {raw:?}")))
}

/// LIMIT/OFFSET arithmetic for 1-based pages.
pub(crate) fn page_offset(page: u32, page_size: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(page_size)
}
