//! Status enums, audit kinds and relation kinds for Tally.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage plus a `FromStr` for the reverse.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Implements `Display` and `FromStr` in terms of `as_str()` and `ALL`.
macro_rules! string_enum {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| CoreError::InvalidEnum {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// ObjectiveStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl ObjectiveStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Active, Self::Completed, Self::Archived];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

string_enum!(ObjectiveStatus, "objective status");

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Priority of a key result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 5] = [Self::None, Self::Low, Self::Medium, Self::High, Self::Urgent];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

string_enum!(Priority, "priority");

// ---------------------------------------------------------------------------
// ProgressBucket
// ---------------------------------------------------------------------------

/// Coarse progress band of a key result, used by the progress facet.
///
/// ```text
/// progress = (current - start) / (target - start)
///   <= 0          not_started
///   (0, 0.4)      at_risk
///   [0.4, 0.7)    behind
///   [0.7, 1)      on_track
///   >= 1          completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBucket {
    NotStarted,
    AtRisk,
    Behind,
    OnTrack,
    Completed,
}

impl ProgressBucket {
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::AtRisk,
        Self::Behind,
        Self::OnTrack,
        Self::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AtRisk => "at_risk",
            Self::Behind => "behind",
            Self::OnTrack => "on_track",
            Self::Completed => "completed",
        }
    }

    /// Classify a progress ratio. A degenerate range (`target == start`)
    /// counts as completed once `current` reaches the target.
    #[must_use]
    pub fn classify(start: f64, target: f64, current: f64) -> Self {
        let span = target - start;
        #[allow(clippy::float_cmp)]
        let ratio = if span == 0.0 {
            if current >= target { 1.0 } else { 0.0 }
        } else {
            (current - start) / span
        };
        if ratio >= 1.0 {
            Self::Completed
        } else if ratio >= 0.7 {
            Self::OnTrack
        } else if ratio >= 0.4 {
            Self::Behind
        } else if ratio > 0.0 {
            Self::AtRisk
        } else {
            Self::NotStarted
        }
    }
}

string_enum!(ProgressBucket, "progress bucket");

// ---------------------------------------------------------------------------
// AuditKind
// ---------------------------------------------------------------------------

/// Kind of mutation an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Create,
    Update,
    Delete,
}

impl AuditKind {
    pub const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Delete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

string_enum!(AuditKind, "audit kind");

// ---------------------------------------------------------------------------
// RelationKind
// ---------------------------------------------------------------------------

/// The kind of mutable entity an audit event or proposed update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Objective,
    KeyResult,
}

impl RelationKind {
    pub const ALL: [Self; 2] = [Self::Objective, Self::KeyResult];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::KeyResult => "key_result",
        }
    }
}

string_enum!(RelationKind, "relation kind");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn priority_from_str_roundtrip() {
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "paused".parse::<ObjectiveStatus>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidEnum { kind: "objective status", .. }));
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&RelationKind::KeyResult).unwrap();
        assert_eq!(json, "\"key_result\"");
    }

    #[rstest]
    #[case(0.0, 100.0, 0.0, ProgressBucket::NotStarted)]
    #[case(0.0, 100.0, 10.0, ProgressBucket::AtRisk)]
    #[case(0.0, 100.0, 40.0, ProgressBucket::Behind)]
    #[case(0.0, 100.0, 75.0, ProgressBucket::OnTrack)]
    #[case(0.0, 100.0, 120.0, ProgressBucket::Completed)]
    #[case(100.0, 50.0, 60.0, ProgressBucket::OnTrack)]
    #[case(5.0, 5.0, 5.0, ProgressBucket::Completed)]
    #[case(5.0, 5.0, 4.0, ProgressBucket::NotStarted)]
    fn progress_classification(
        #[case] start: f64,
        #[case] target: f64,
        #[case] current: f64,
        #[case] expected: ProgressBucket,
    ) {
        assert_eq!(ProgressBucket::classify(start, target, current), expected);
    }
}
