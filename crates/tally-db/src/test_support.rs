//! Shared test utilities for tally-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;

    use uuid::Uuid;

    use tally_core::entities::{NewKeyResult, NewObjective, Objective};
    use tally_core::identity::Scope;

    use crate::TallyDb;
    use crate::audit::{AuditRecorder, AuditStore};
    use crate::service::TallyService;

    /// In-memory service with the real libSQL audit store behind the recorder.
    pub async fn test_service() -> TallyService {
        let db = Arc::new(TallyDb::open_local(":memory:").await.unwrap());
        let recorder = AuditRecorder::spawn(AuditStore::new(Arc::clone(&db)), 64);
        TallyService::from_db(db, recorder)
    }

    /// A fresh actor in a fresh tenant.
    pub fn scope() -> Scope {
        Scope::new(Uuid::new_v4(), Uuid::new_v4())
    }

    pub async fn create_objective(svc: &TallyService, scope: Scope, name: &str) -> Objective {
        svc.create_objective(
            scope,
            NewObjective {
                name: name.into(),
                ..NewObjective::default()
            },
            "",
        )
        .await
        .unwrap()
    }

    pub fn new_key_result(objective_id: Uuid, name: &str, target_value: f64) -> NewKeyResult {
        NewKeyResult {
            objective_id,
            name: name.into(),
            target_value,
            ..NewKeyResult::default()
        }
    }
}
