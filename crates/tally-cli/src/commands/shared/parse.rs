use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Flag value that clears a nullable field on update.
pub const CLEAR: &str = "none";

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_datetime(raw: &str, field: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow::anyhow!("invalid {field} '{raw}': expected RFC 3339 or YYYY-MM-DD"))
}

/// Parse a reference flag where [`CLEAR`] means "unset".
pub fn parse_clearable_uuid(raw: &str, field: &str) -> anyhow::Result<Option<Uuid>> {
    if raw.eq_ignore_ascii_case(CLEAR) {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse a date flag where [`CLEAR`] means "unset".
pub fn parse_clearable_datetime(raw: &str, field: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    if raw.eq_ignore_ascii_case(CLEAR) {
        return Ok(None);
    }
    parse_datetime(raw, field).map(Some)
}

/// Parse a `--json` update body. Only objects are accepted.
pub fn parse_json_object(raw: &str) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => anyhow::bail!("--json must be an object, got {other}"),
        Err(error) => Err(anyhow::anyhow!("invalid --json body: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tally_core::enums::{ObjectiveStatus, ProgressBucket};

    use super::*;

    #[test]
    fn parses_snake_case_enum() {
        let status: ObjectiveStatus = parse_enum("active", "status").expect("status should parse");
        assert_eq!(status, ObjectiveStatus::Active);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let bucket: ProgressBucket =
            parse_enum("not-started", "bucket").expect("bucket should parse");
        assert_eq!(bucket, ProgressBucket::NotStarted);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<ObjectiveStatus>("done", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'done'"));
    }

    #[test]
    fn parses_bare_date_as_utc_midnight() {
        let dt = parse_datetime("2026-03-01", "due-date").expect("date should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_offset_timestamp() {
        let dt = parse_datetime("2026-03-01T02:00:00+02:00", "due-date").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn none_clears_references_and_dates() {
        assert_eq!(parse_clearable_uuid("none", "lead").unwrap(), None);
        assert_eq!(parse_clearable_datetime("NONE", "due-date").unwrap(), None);
    }

    #[test]
    fn clearable_uuid_rejects_garbage() {
        let err = parse_clearable_uuid("bob", "lead").unwrap_err();
        assert!(err.to_string().contains("invalid lead 'bob'"));
    }

    #[test]
    fn json_body_must_be_object() {
        assert!(parse_json_object(r#"{"name":"x"}"#).is_ok());
        assert!(parse_json_object("[1,2]").is_err());
        assert!(parse_json_object("{").is_err());
    }
}
