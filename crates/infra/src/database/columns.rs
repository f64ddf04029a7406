//! Column codecs shared by the repositories.
//!
//! SQLite stores integers as i64; timestamps are epoch milliseconds.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

pub(crate) fn datetime_to_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn ms_to_datetime(column: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {ms}").into(),
        )
    })
}

pub(crate) fn opt_ms_to_datetime(
    column: usize,
    ms: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    ms.map(|value| ms_to_datetime(column, value)).transpose()
}

pub(crate) fn u64_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn i64_to_u64(column: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(e))
    })
}

pub(crate) fn i64_to_u32(column: usize, value: i64) -> rusqlite::Result<u32> {
    u32::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(e))
    })
}

pub(crate) fn parse_status<T>(column: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, e.into()))
}
