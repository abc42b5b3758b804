//! Service layer orchestrating mutations with the audit recorder.
//!
//! `TallyService` wraps `TallyDb` (raw database access) and the
//! `AuditRecorder` (background audit appends). All repo methods are
//! implemented as `impl TallyService` blocks under `repos/`.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use tally_config::{AuditConfig, GeneralConfig, TallyConfig};
use tally_core::audit::{AuditContext, update_batch};
use tally_core::diff::{Snapshot, diff};
use tally_core::identity::Scope;
use tally_core::proposed::ProposedUpdate;

use crate::TallyDb;
use crate::audit::{AuditRecorder, AuditStore};
use crate::error::DatabaseError;
use crate::mutation::prepare;

/// Result of an update: the entity as it is now, and the wire names of
/// the fields that changed (empty for a no-op).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome<T> {
    pub entity: T,
    pub changed: Vec<String>,
}

impl<T> UpdateOutcome<T> {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Orchestrates mutations, audit recording and analytics.
///
/// Every update follows this protocol:
/// 1. Load the current snapshot (tenant-scoped)
/// 2. Diff the proposed fields against it; stop if nothing changed
/// 3. Validate and apply the change set in one transaction
/// 4. Enqueue the audit batch (never fails the caller)
pub struct TallyService {
    db: Arc<TallyDb>,
    audit: AuditRecorder,
    audit_store: AuditStore,
    general: GeneralConfig,
}

impl TallyService {
    /// Open the service described by a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(config: &TallyConfig) -> Result<Self, DatabaseError> {
        let mut service = Self::new_local(&config.database.path, &config.audit).await?;
        service.general = config.general.clone();
        Ok(service)
    }

    /// Create a service over a local database file, or `":memory:"`.
    ///
    /// Spawns the audit recorder on the current runtime unless
    /// `audit.enabled` is false.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created or
    /// the database cannot be opened.
    pub async fn new_local(db_path: &str, audit: &AuditConfig) -> Result<Self, DatabaseError> {
        if db_path != tally_config::IN_MEMORY {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DatabaseError::Other(anyhow::anyhow!(
                            "create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = Arc::new(TallyDb::open_local(db_path).await?);
        let recorder = if audit.enabled {
            AuditRecorder::spawn(AuditStore::new(Arc::clone(&db)), audit.channel_capacity)
        } else {
            tracing::info!("audit recording disabled by configuration");
            AuditRecorder::disabled()
        };
        Ok(Self::from_db(db, recorder))
    }

    /// Create from an existing `TallyDb` and recorder (for testing).
    #[must_use]
    pub fn from_db(db: Arc<TallyDb>, audit: AuditRecorder) -> Self {
        Self {
            audit_store: AuditStore::new(Arc::clone(&db)),
            db,
            audit,
            general: GeneralConfig::default(),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub fn db(&self) -> &TallyDb {
        &self.db
    }

    /// Access the audit recorder.
    #[must_use]
    pub const fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    #[must_use]
    pub const fn audit_store(&self) -> &AuditStore {
        &self.audit_store
    }

    #[must_use]
    pub const fn general(&self) -> &GeneralConfig {
        &self.general
    }

    /// Diff, apply and audit one update against a loaded snapshot.
    ///
    /// Returns the changed field names; empty means nothing was written.
    pub(crate) async fn apply_diff<S: Snapshot>(
        &self,
        scope: Scope,
        entity_id: Uuid,
        current: &S,
        proposed: &ProposedUpdate,
        comment: &str,
    ) -> Result<Vec<String>, DatabaseError> {
        if proposed.relation() != S::RELATION {
            return Err(DatabaseError::Validation(format!(
                "update for {} applied to {}",
                proposed.relation(),
                S::RELATION
            )));
        }

        let changes = diff(proposed, current);
        if changes.is_empty() {
            tracing::debug!(%entity_id, relation = %S::RELATION, "update is a no-op");
            return Ok(Vec::new());
        }

        let prepared = prepare(S::RELATION, &changes)?;
        let now = now();
        self.db
            .apply_update(S::RELATION, entity_id, scope.tenant_id, &prepared, now)
            .await?;

        let ctx = AuditContext {
            entity_id,
            relation: S::RELATION,
            scope,
            comment: comment.to_string(),
            at: now,
        };
        self.audit.record(update_batch(&ctx, &changes));

        let changed = changes.changed_names();
        tracing::info!(
            %entity_id,
            relation = %S::RELATION,
            actor_id = %scope.actor_id,
            changed = ?changed,
            "entity updated"
        );
        Ok(changed)
    }
}

/// Current time at storage precision, so returned entities compare equal
/// to what a later read produces.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
