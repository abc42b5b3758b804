//! The field model of mutable entities.
//!
//! Every updatable attribute of an objective or key result is a [`Field`]
//! with a wire name (camelCase, as clients send it), a SQL column and a
//! semantic [`FieldKind`]. Names arriving from outside are parsed into a
//! [`FieldName`], which keeps unrecognized names instead of dropping them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::enums::RelationKind;

/// Semantic type of a field, selecting its comparator and renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    /// Optional instant.
    Timestamp,
    /// Optional reference to another record.
    Reference,
    /// Unordered set of references, replaced wholesale.
    ReferenceSet,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Timestamp => "timestamp",
            Self::Reference => "reference",
            Self::ReferenceSet => "reference set",
        })
    }
}

/// A known, updatable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Status,
    Priority,
    Unit,
    StartValue,
    TargetValue,
    CurrentValue,
    LeadId,
    TeamId,
    StartDate,
    TargetDate,
    DueDate,
    Contributors,
}

const OBJECTIVE_FIELDS: &[Field] = &[
    Field::Name,
    Field::Description,
    Field::Status,
    Field::LeadId,
    Field::TeamId,
    Field::StartDate,
    Field::TargetDate,
];

const KEY_RESULT_FIELDS: &[Field] = &[
    Field::Name,
    Field::Description,
    Field::Priority,
    Field::Unit,
    Field::StartValue,
    Field::TargetValue,
    Field::CurrentValue,
    Field::LeadId,
    Field::TeamId,
    Field::DueDate,
    Field::Contributors,
];

impl Field {
    pub const ALL: [Self; 14] = [
        Self::Name,
        Self::Description,
        Self::Status,
        Self::Priority,
        Self::Unit,
        Self::StartValue,
        Self::TargetValue,
        Self::CurrentValue,
        Self::LeadId,
        Self::TeamId,
        Self::StartDate,
        Self::TargetDate,
        Self::DueDate,
        Self::Contributors,
    ];

    /// Wire name used in request bodies and audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Unit => "unit",
            Self::StartValue => "startValue",
            Self::TargetValue => "targetValue",
            Self::CurrentValue => "currentValue",
            Self::LeadId => "leadId",
            Self::TeamId => "teamId",
            Self::StartDate => "startDate",
            Self::TargetDate => "targetDate",
            Self::DueDate => "dueDate",
            Self::Contributors => "contributors",
        }
    }

    /// SQL column. `Contributors` lives in a join table and has none.
    #[must_use]
    pub const fn column(self) -> Option<&'static str> {
        match self {
            Self::Name => Some("name"),
            Self::Description => Some("description"),
            Self::Status => Some("status"),
            Self::Priority => Some("priority"),
            Self::Unit => Some("unit"),
            Self::StartValue => Some("start_value"),
            Self::TargetValue => Some("target_value"),
            Self::CurrentValue => Some("current_value"),
            Self::LeadId => Some("lead_id"),
            Self::TeamId => Some("team_id"),
            Self::StartDate => Some("start_date"),
            Self::TargetDate => Some("target_date"),
            Self::DueDate => Some("due_date"),
            Self::Contributors => None,
        }
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Name | Self::Description | Self::Status | Self::Priority | Self::Unit => {
                FieldKind::Text
            }
            Self::StartValue | Self::TargetValue | Self::CurrentValue => FieldKind::Number,
            Self::LeadId | Self::TeamId => FieldKind::Reference,
            Self::StartDate | Self::TargetDate | Self::DueDate => FieldKind::Timestamp,
            Self::Contributors => FieldKind::ReferenceSet,
        }
    }

    /// Fields that exist on the given entity.
    #[must_use]
    pub const fn fields_for(relation: RelationKind) -> &'static [Self] {
        match relation {
            RelationKind::Objective => OBJECTIVE_FIELDS,
            RelationKind::KeyResult => KEY_RESULT_FIELDS,
        }
    }

    #[must_use]
    pub fn belongs_to(self, relation: RelationKind) -> bool {
        Self::fields_for(relation).contains(&self)
    }

    /// Look up a field by its wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field name as received from a caller.
///
/// Ordering is lexicographic on the wire name, which is the order audit
/// batches are emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    Known(Field),
    Unknown(String),
}

impl FieldName {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Field::from_wire(name).map_or_else(|| Self::Unknown(name.to_string()), Self::Known)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(field) => field.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub const fn known(&self) -> Option<Field> {
        match self {
            Self::Known(field) => Some(*field),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Field> for FieldName {
    fn from(field: Field) -> Self {
        Self::Known(field)
    }
}

impl Ord for FieldName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for FieldName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_wire(field.as_str()), Some(field));
        }
    }

    #[test]
    fn unknown_names_are_kept() {
        assert_eq!(
            FieldName::parse("colour"),
            FieldName::Unknown("colour".to_string())
        );
        assert_eq!(FieldName::parse("targetValue"), FieldName::Known(Field::TargetValue));
    }

    #[test]
    fn ordering_is_lexicographic_by_wire_name() {
        let mut names = vec![
            FieldName::Known(Field::TargetValue),
            FieldName::Unknown("aardvark".into()),
            FieldName::Known(Field::Name),
            FieldName::Known(Field::Contributors),
        ];
        names.sort();
        let order: Vec<&str> = names.iter().map(FieldName::as_str).collect();
        assert_eq!(order, ["aardvark", "contributors", "name", "targetValue"]);
    }

    #[test]
    fn entity_field_sets() {
        assert!(Field::Status.belongs_to(RelationKind::Objective));
        assert!(!Field::Status.belongs_to(RelationKind::KeyResult));
        assert!(Field::Contributors.belongs_to(RelationKind::KeyResult));
        assert!(!Field::Contributors.belongs_to(RelationKind::Objective));
        for relation in RelationKind::ALL {
            for field in Field::fields_for(relation) {
                assert_eq!(field.column().is_none(), *field == Field::Contributors);
            }
        }
    }
}
