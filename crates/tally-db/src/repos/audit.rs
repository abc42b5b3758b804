//! Audit history reads.

use uuid::Uuid;

use tally_core::identity::Scope;

use crate::audit::AuditPage;
use crate::error::DatabaseError;
use crate::service::TallyService;

impl TallyService {
    /// One page of an entity's audit history, newest first.
    ///
    /// Works for deleted entities too; events outlive their entity.
    /// `page_size` falls back to `general.default_page_size` and is capped
    /// at `general.max_page_size`.
    ///
    /// Events still queued in the recorder are not visible until it has
    /// drained; call [`AuditRecorder::flush`](crate::AuditRecorder::flush)
    /// first when read-after-write matters.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn audit_history(
        &self,
        scope: Scope,
        entity_id: Uuid,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<AuditPage, DatabaseError> {
        let page_size = self.general().page_size(page_size);
        self.audit_store()
            .query(entity_id, scope.tenant_id, page, page_size)
            .await
    }
}
