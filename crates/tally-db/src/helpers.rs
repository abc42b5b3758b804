//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing and the storage formats:
//! UUIDs as hyphenated TEXT, timestamps as RFC 3339 TEXT with microseconds.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Storage form of a timestamp.
///
/// Fixed-width UTC with microseconds, so `ORDER BY` on the column is
/// chronological and `date(...)` in SQL sees a valid time string.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column holding a UUID.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a UUID.
pub fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Query(format!("Invalid UUID '{s}': {e}")))
}

/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a UUID.
pub fn parse_optional_uuid(s: Option<&str>) -> Result<Option<Uuid>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_uuid(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into one of the tally-core string enums.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any variant.
pub fn parse_enum<T>(s: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse()
        .map_err(|e: T::Err| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Bind an optional UUID as TEXT or NULL.
#[must_use]
pub fn opt_uuid_value(id: Option<Uuid>) -> libsql::Value {
    id.map_or(libsql::Value::Null, |id| id.to_string().into())
}

/// Bind an optional timestamp as TEXT or NULL.
#[must_use]
pub fn opt_datetime_value(dt: Option<&DateTime<Utc>>) -> libsql::Value {
    dt.map_or(libsql::Value::Null, |dt| format_datetime(dt).into())
}

/// Detect unique-constraint violations on a failed write.
///
/// libSQL reports them only through the message text.
pub fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

/// Map a failed write to `Conflict` when it hit a uniqueness constraint.
#[must_use]
pub fn classify_write_error(e: libsql::Error, what: &str) -> DatabaseError {
    if is_unique_violation(&e) {
        DatabaseError::Conflict(format!("{what}: {e}"))
    } else {
        DatabaseError::LibSql(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_core::enums::Priority;

    #[test]
    fn datetime_storage_roundtrip_keeps_micros() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 15).unwrap()
            + chrono::Duration::microseconds(123_456);
        let stored = format_datetime(&dt);
        assert_eq!(stored, "2026-03-01T09:30:15.123456Z");
        assert_eq!(parse_datetime(&stored).unwrap(), dt);
    }

    #[test]
    fn parse_sqlite_default_format() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap());
    }

    #[test]
    fn parse_optional_empty_is_none() {
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
        assert_eq!(parse_optional_uuid(None).unwrap(), None);
    }

    #[test]
    fn parse_enum_reports_bad_text() {
        assert_eq!(parse_enum::<Priority>("high").unwrap(), Priority::High);
        let err = parse_enum::<Priority>("critical").unwrap_err();
        assert!(err.to_string().contains("critical"));
    }

    #[test]
    fn parse_uuid_rejects_garbage() {
        assert!(matches!(parse_uuid("nope"), Err(DatabaseError::Query(_))));
    }
}
