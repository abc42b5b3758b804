//! Audit trail storage and the background recorder.
//!
//! [`AuditSink`] is the seam between the recorder and wherever events end
//! up. [`AuditStore`] is the libSQL implementation and also serves the
//! paginated history reads.

mod recorder;

pub use recorder::AuditRecorder;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use tally_core::entities::AuditEvent;

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, parse_datetime, parse_enum, parse_uuid};

/// Destination for audit events. Owned exclusively by the recorder task.
pub trait AuditSink: Send + Sync + 'static {
    /// Persist one event.
    fn append(&self, event: &AuditEvent) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// One page of an entity's audit history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub events: Vec<AuditEvent>,
    pub has_more: bool,
}

const SELECT_COLS: &str = "id, entity_id, actor_id, kind, relation_kind, field, rendered_value, comment, tenant_id, created_at";

fn row_to_event(row: &libsql::Row) -> Result<AuditEvent, DatabaseError> {
    Ok(AuditEvent {
        id: parse_uuid(&row.get::<String>(0)?)?,
        entity_id: parse_uuid(&row.get::<String>(1)?)?,
        actor_id: parse_uuid(&row.get::<String>(2)?)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        relation_kind: parse_enum(&row.get::<String>(4)?)?,
        field: row.get(5)?,
        rendered_value: row.get(6)?,
        comment: row.get(7)?,
        tenant_id: parse_uuid(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// libSQL-backed audit storage.
#[derive(Clone)]
pub struct AuditStore {
    db: Arc<TallyDb>,
}

impl AuditStore {
    #[must_use]
    pub const fn new(db: Arc<TallyDb>) -> Self {
        Self { db }
    }

    /// Insert one event. Appends go through the writer gate so they never
    /// interleave with a mutation transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the insert fails.
    pub async fn insert(&self, event: &AuditEvent) -> Result<(), DatabaseError> {
        let writer = self.db.writer().await;
        writer
            .execute(
                &format!(
                    "INSERT INTO audit_events ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    event.id.to_string(),
                    event.entity_id.to_string(),
                    event.actor_id.to_string(),
                    event.kind.as_str(),
                    event.relation_kind.as_str(),
                    event.field.as_str(),
                    event.rendered_value.as_str(),
                    event.comment.as_str(),
                    event.tenant_id.to_string(),
                    format_datetime(&event.created_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Page through an entity's history, newest first.
    ///
    /// `page` is 1-based (0 is treated as 1). Fetches one row beyond the
    /// page to decide `has_more`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be parsed.
    pub async fn query(
        &self,
        entity_id: Uuid,
        tenant_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<AuditPage, DatabaseError> {
        let page_size = page_size.max(1);
        let offset = i64::from(page.max(1) - 1) * i64::from(page_size);

        let reader = self.db.reader().await;
        let mut rows = reader
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_events
                     WHERE entity_id = ?1 AND tenant_id = ?2
                     ORDER BY seq DESC
                     LIMIT ?3 OFFSET ?4"
                ),
                libsql::params![
                    entity_id.to_string(),
                    tenant_id.to_string(),
                    i64::from(page_size) + 1,
                    offset
                ],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }

        let has_more = events.len() > page_size as usize;
        events.truncate(page_size as usize);
        Ok(AuditPage { events, has_more })
    }
}

impl AuditSink for AuditStore {
    async fn append(&self, event: &AuditEvent) -> Result<(), DatabaseError> {
        self.insert(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{SubsecRound, Utc};
    use pretty_assertions::assert_eq;
    use tally_core::enums::{AuditKind, RelationKind};

    fn event(entity_id: Uuid, tenant_id: Uuid, field: &str) -> AuditEvent {
        AuditEvent {
            id: Uuid::new_v4(),
            entity_id,
            actor_id: Uuid::new_v4(),
            kind: AuditKind::Update,
            relation_kind: RelationKind::KeyResult,
            field: field.into(),
            rendered_value: "1.00".into(),
            comment: String::new(),
            tenant_id,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    async fn store() -> AuditStore {
        AuditStore::new(Arc::new(TallyDb::open_local(":memory:").await.unwrap()))
    }

    #[tokio::test]
    async fn query_pages_newest_first() {
        let store = store().await;
        let (entity, tenant) = (Uuid::new_v4(), Uuid::new_v4());
        for field in ["a", "b", "c", "d", "e"] {
            store.append(&event(entity, tenant, field)).await.unwrap();
        }

        let first = store.query(entity, tenant, 1, 2).await.unwrap();
        let fields: Vec<&str> = first.events.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["e", "d"]);
        assert!(first.has_more);

        let last = store.query(entity, tenant, 3, 2).await.unwrap();
        assert_eq!(last.events.len(), 1);
        assert_eq!(last.events[0].field, "a");
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn exact_page_has_no_more() {
        let store = store().await;
        let (entity, tenant) = (Uuid::new_v4(), Uuid::new_v4());
        for field in ["a", "b"] {
            store.append(&event(entity, tenant, field)).await.unwrap();
        }
        let page = store.query(entity, tenant, 0, 2).await.unwrap();
        assert_eq!(page.events.len(), 2);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn query_is_tenant_scoped() {
        let store = store().await;
        let entity = Uuid::new_v4();
        store
            .append(&event(entity, Uuid::new_v4(), "name"))
            .await
            .unwrap();

        let page = store.query(entity, Uuid::new_v4(), 1, 10).await.unwrap();
        assert!(page.events.is_empty());
    }

    #[tokio::test]
    async fn stored_event_roundtrips() {
        let store = store().await;
        let original = event(Uuid::new_v4(), Uuid::new_v4(), "targetValue");
        store.append(&original).await.unwrap();

        let page = store
            .query(original.entity_id, original.tenant_id, 1, 1)
            .await
            .unwrap();
        assert_eq!(page.events, vec![original]);
    }
}
