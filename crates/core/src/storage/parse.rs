//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;
use uuid::Uuid;

use crate::models::{parse_clock, BookingStatus, SpaceType, UserRole};

fn conversion_error<E>(idx: usize, err: E) -> SqlError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug)]
struct UnknownValue(String);

impl std::fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unexpected stored value: {}", self.0)
    }
}

impl std::error::Error for UnknownValue {}

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s).map_err(|e| conversion_error(0, e))
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

/// Parse an optional DateTime from an RFC3339 string
pub fn parse_datetime_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>, SqlError> {
    s.map(|s| parse_datetime(&s)).transpose()
}

/// Format a timestamp with fixed precision so text order matches time order
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a calendar date stored as `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate, SqlError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| conversion_error(0, e))
}

/// Parse a wall-clock time stored as `HH:MM`
pub fn parse_time(s: &str) -> Result<NaiveTime, SqlError> {
    parse_clock(s).ok_or_else(|| conversion_error(0, UnknownValue(s.to_string())))
}

pub fn parse_role(s: &str) -> Result<UserRole, SqlError> {
    UserRole::from_str(s).ok_or_else(|| conversion_error(0, UnknownValue(s.to_string())))
}

pub fn parse_space_type(s: &str) -> Result<SpaceType, SqlError> {
    SpaceType::from_str(s).ok_or_else(|| conversion_error(0, UnknownValue(s.to_string())))
}

pub fn parse_status(s: &str) -> Result<BookingStatus, SqlError> {
    BookingStatus::from_str(s).ok_or_else(|| conversion_error(0, UnknownValue(s.to_string())))
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formatted_timestamps_sort_lexically() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(500);

        let a = format_datetime(&whole);
        let b = format_datetime(&later);
        assert!(a < b);
        assert_eq!(parse_datetime(&a).unwrap(), whole);
    }

    #[test]
    fn test_unknown_enum_value_is_conversion_error() {
        assert!(matches!(
            parse_status("pending"),
            Err(SqlError::FromSqlConversionFailure(..))
        ));
        assert_eq!(parse_role("admin").unwrap(), UserRole::Admin);
    }
}
