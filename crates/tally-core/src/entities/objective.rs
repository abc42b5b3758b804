use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diff::Snapshot;
use crate::enums::{ObjectiveStatus, RelationKind};
use crate::field::Field;
use crate::value::FieldValue;

/// A tenant-scoped objective that key results roll up into.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ObjectiveStatus,
    pub lead_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating an objective.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewObjective {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<ObjectiveStatus>,
    #[serde(default)]
    pub lead_id: Option<Uuid>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
}

impl Snapshot for Objective {
    const RELATION: RelationKind = RelationKind::Objective;

    fn value_of(&self, field: Field) -> Option<FieldValue> {
        Some(match field {
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Description => FieldValue::Text(self.description.clone()),
            Field::Status => FieldValue::Text(self.status.as_str().to_string()),
            Field::LeadId => FieldValue::Reference(self.lead_id),
            Field::TeamId => FieldValue::Reference(self.team_id),
            Field::StartDate => FieldValue::Timestamp(self.start_date),
            Field::TargetDate => FieldValue::Timestamp(self.target_date),
            Field::Priority
            | Field::Unit
            | Field::StartValue
            | Field::TargetValue
            | Field::CurrentValue
            | Field::DueDate
            | Field::Contributors => return None,
        })
    }
}
