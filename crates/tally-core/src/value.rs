//! Typed field values and their audit rendering.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::field::FieldKind;

/// Rendered form of an absent optional value in audit events.
pub const NIL_SENTINEL: &str = "<none>";

/// Wire format for timestamps in audit events (always UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Fractional-second digits kept by storage.
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// Truncate to the precision storage keeps, so a resent value compares
/// equal to what was persisted.
#[must_use]
pub fn at_storage_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS)
}

/// A proposed or persisted value of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Timestamp(Option<DateTime<Utc>>),
    Reference(Option<Uuid>),
    ReferenceSet(Vec<Uuid>),
    /// Input that did not fit the field's kind. Never equal to a snapshot
    /// value and never writable.
    Raw(serde_json::Value),
}

impl FieldValue {
    /// The kind this value satisfies, or `None` for `Raw`.
    #[must_use]
    pub const fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Text(_) => Some(FieldKind::Text),
            Self::Number(_) => Some(FieldKind::Number),
            Self::Timestamp(_) => Some(FieldKind::Timestamp),
            Self::Reference(_) => Some(FieldKind::Reference),
            Self::ReferenceSet(_) => Some(FieldKind::ReferenceSet),
            Self::Raw(_) => None,
        }
    }

    /// Convert a decoded JSON value into the given kind.
    ///
    /// Anything that does not fit (wrong JSON type, unparsable UUID or
    /// timestamp, `null` for a non-optional kind) is kept as `Raw`.
    #[must_use]
    pub fn from_json(kind: FieldKind, value: serde_json::Value) -> Self {
        use serde_json::Value as J;

        let converted = match (kind, &value) {
            (FieldKind::Text, J::String(s)) => Some(Self::Text(s.clone())),
            (FieldKind::Number, J::Number(n)) => n.as_f64().map(Self::Number),
            (FieldKind::Timestamp, J::Null) => Some(Self::Timestamp(None)),
            (FieldKind::Timestamp, J::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| Self::Timestamp(Some(at_storage_precision(dt.with_timezone(&Utc))))),
            (FieldKind::Reference, J::Null) => Some(Self::Reference(None)),
            (FieldKind::Reference, J::String(s)) => {
                Uuid::parse_str(s).ok().map(|id| Self::Reference(Some(id)))
            }
            (FieldKind::ReferenceSet, J::Null) => Some(Self::ReferenceSet(Vec::new())),
            (FieldKind::ReferenceSet, J::Array(items)) => items
                .iter()
                .map(|item| item.as_str().and_then(|s| Uuid::parse_str(s).ok()))
                .collect::<Option<Vec<_>>>()
                .map(Self::ReferenceSet),
            _ => None,
        };
        converted.unwrap_or(Self::Raw(value))
    }

    /// String form stored in `AuditEvent::rendered_value`.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format!("{n:.2}"),
            Self::Timestamp(Some(ts)) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Self::Reference(Some(id)) => id.to_string(),
            Self::Timestamp(None) | Self::Reference(None) => NIL_SENTINEL.to_string(),
            Self::ReferenceSet(ids) => ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Raw(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<Uuid>> for FieldValue {
    fn from(value: Option<Uuid>) -> Self {
        Self::Reference(value)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        Self::Timestamp(value.map(at_storage_precision))
    }
}
