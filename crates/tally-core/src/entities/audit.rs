use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AuditKind, RelationKind};

/// An append-only record of one field-level change.
///
/// `field` is a wire field name, or `*` for whole-entity create/delete
/// events. Events outlive the entity they describe.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub actor_id: Uuid,
    pub kind: AuditKind,
    pub relation_kind: RelationKind,
    pub field: String,
    pub rendered_value: String,
    pub comment: String,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
}
