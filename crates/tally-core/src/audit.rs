//! Audit batch construction.
//!
//! Turns the outcome of a mutation into the ordered list of
//! [`AuditEvent`]s that describe it. Ordering is lexicographic by wire
//! field name, and only the last event of a batch carries the caller's
//! comment.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::diff::FieldDiff;
use crate::entities::AuditEvent;
use crate::enums::{AuditKind, RelationKind};
use crate::field::Field;
use crate::identity::Scope;
use crate::value::FieldValue;

/// Field name used by whole-entity create and delete events.
pub const WHOLE_ENTITY_FIELD: &str = "*";

/// Everything about a mutation that is shared by its audit events.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub entity_id: Uuid,
    pub relation: RelationKind,
    pub scope: Scope,
    pub comment: String,
    pub at: DateTime<Utc>,
}

impl AuditContext {
    fn event(&self, kind: AuditKind, field: String, rendered_value: String) -> AuditEvent {
        AuditEvent {
            id: Uuid::new_v4(),
            entity_id: self.entity_id,
            actor_id: self.scope.actor_id,
            kind,
            relation_kind: self.relation,
            field,
            rendered_value,
            comment: String::new(),
            tenant_id: self.scope.tenant_id,
            created_at: self.at,
        }
    }
}

/// Build the per-field events for an update.
///
/// One event per changed scalar field, plus one for a contributor set that
/// changed to a non-empty set. Clearing contributors produces no event.
#[must_use]
pub fn update_batch(ctx: &AuditContext, diff: &FieldDiff) -> Vec<AuditEvent> {
    let mut entries: Vec<(String, String)> = diff
        .fields
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.render()))
        .collect();

    if let Some(ids) = diff.contributors.as_ref().filter(|ids| !ids.is_empty()) {
        entries.push((
            Field::Contributors.as_str().to_string(),
            FieldValue::ReferenceSet(ids.clone()).render(),
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut events: Vec<AuditEvent> = entries
        .into_iter()
        .map(|(field, rendered)| ctx.event(AuditKind::Update, field, rendered))
        .collect();
    if let Some(last) = events.last_mut() {
        last.comment.clone_from(&ctx.comment);
    }
    events
}

/// The single event recorded when an entity is created.
#[must_use]
pub fn create_event(ctx: &AuditContext, rendered_entity: String) -> AuditEvent {
    AuditEvent {
        comment: ctx.comment.clone(),
        ..ctx.event(AuditKind::Create, WHOLE_ENTITY_FIELD.to_string(), rendered_entity)
    }
}

/// The final event recorded before an entity row is removed.
#[must_use]
pub fn delete_event(ctx: &AuditContext, entity_name: &str) -> AuditEvent {
    AuditEvent {
        comment: ctx.comment.clone(),
        ..ctx.event(AuditKind::Delete, WHOLE_ENTITY_FIELD.to_string(), entity_name.to_string())
    }
}
