use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diff::Snapshot;
use crate::enums::{Priority, RelationKind};
use crate::field::Field;
use crate::value::FieldValue;

/// A measurable key result under an objective.
///
/// `contributors` keeps insertion order, but only membership matters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub objective_id: Uuid,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub unit: String,
    pub start_value: f64,
    pub target_value: f64,
    pub current_value: f64,
    pub lead_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub contributors: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a key result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewKeyResult {
    pub objective_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub start_value: f64,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub lead_id: Option<Uuid>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contributors: Vec<Uuid>,
}

impl Snapshot for KeyResult {
    const RELATION: RelationKind = RelationKind::KeyResult;

    fn value_of(&self, field: Field) -> Option<FieldValue> {
        Some(match field {
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Description => FieldValue::Text(self.description.clone()),
            Field::Priority => FieldValue::Text(self.priority.as_str().to_string()),
            Field::Unit => FieldValue::Text(self.unit.clone()),
            Field::StartValue => FieldValue::Number(self.start_value),
            Field::TargetValue => FieldValue::Number(self.target_value),
            Field::CurrentValue => FieldValue::Number(self.current_value),
            Field::LeadId => FieldValue::Reference(self.lead_id),
            Field::TeamId => FieldValue::Reference(self.team_id),
            Field::DueDate => FieldValue::Timestamp(self.due_date),
            Field::Contributors => FieldValue::ReferenceSet(self.contributors.clone()),
            Field::Status | Field::StartDate | Field::TargetDate => return None,
        })
    }
}
