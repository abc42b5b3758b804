//! Objective repository: CRUD with audit events.

use uuid::Uuid;

use tally_core::audit::{AuditContext, create_event, delete_event};
use tally_core::entities::{NewObjective, Objective};
use tally_core::enums::{ObjectiveStatus, RelationKind};
use tally_core::identity::Scope;
use tally_core::proposed::ProposedUpdate;
use tally_core::value::at_storage_precision;

use crate::error::DatabaseError;
use crate::helpers::{
    classify_write_error, format_datetime, get_opt_string, opt_datetime_value, opt_uuid_value,
    parse_datetime, parse_enum, parse_optional_datetime, parse_optional_uuid, parse_uuid,
};
use crate::mutation::finish;
use crate::service::{TallyService, UpdateOutcome, now};

const ENTITY: &str = "objective";

const SELECT_COLS: &str = "id, tenant_id, name, description, status, lead_id, team_id, start_date, target_date, created_by, created_at, updated_at";

fn row_to_objective(row: &libsql::Row) -> Result<Objective, DatabaseError> {
    Ok(Objective {
        id: parse_uuid(&row.get::<String>(0)?)?,
        tenant_id: parse_uuid(&row.get::<String>(1)?)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        lead_id: parse_optional_uuid(get_opt_string(row, 5)?.as_deref())?,
        team_id: parse_optional_uuid(get_opt_string(row, 6)?.as_deref())?,
        start_date: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        target_date: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        created_by: parse_uuid(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl TallyService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name and
    /// `DatabaseError::Conflict` if the tenant already has an objective
    /// with this name.
    pub async fn create_objective(
        &self,
        scope: Scope,
        new: NewObjective,
        comment: &str,
    ) -> Result<Objective, DatabaseError> {
        if new.name.trim().is_empty() {
            return Err(DatabaseError::Validation("objective name must not be blank".into()));
        }

        let now = now();
        let objective = Objective {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            name: new.name,
            description: new.description,
            status: new.status.unwrap_or(ObjectiveStatus::Draft),
            lead_id: new.lead_id,
            team_id: new.team_id,
            start_date: new.start_date.map(at_storage_precision),
            target_date: new.target_date.map(at_storage_precision),
            created_by: scope.actor_id,
            created_at: now,
            updated_at: now,
        };

        self.db()
            .writer()
            .await
            .execute(
                &format!(
                    "INSERT INTO objectives ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    objective.id.to_string(),
                    objective.tenant_id.to_string(),
                    objective.name.as_str(),
                    objective.description.as_str(),
                    objective.status.as_str(),
                    opt_uuid_value(objective.lead_id),
                    opt_uuid_value(objective.team_id),
                    opt_datetime_value(objective.start_date.as_ref()),
                    opt_datetime_value(objective.target_date.as_ref()),
                    objective.created_by.to_string(),
                    format_datetime(&now),
                    format_datetime(&now)
                ],
            )
            .await
            .map_err(|e| classify_write_error(e, ENTITY))?;

        let rendered = serde_json::to_string(&objective).map_err(|e| DatabaseError::Other(e.into()))?;
        self.audit().record(vec![create_event(
            &AuditContext {
                entity_id: objective.id,
                relation: RelationKind::Objective,
                scope,
                comment: comment.to_string(),
                at: now,
            },
            rendered,
        )]);

        tracing::info!(objective_id = %objective.id, name = %objective.name, "objective created");
        Ok(objective)
    }

    /// Load one objective in the caller's tenant.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no objective with this id exists
    /// in the tenant.
    pub async fn get_objective(&self, scope: Scope, id: Uuid) -> Result<Objective, DatabaseError> {
        let reader = self.db().reader().await;
        let mut rows = reader
            .query(
                &format!("SELECT {SELECT_COLS} FROM objectives WHERE id = ?1 AND tenant_id = ?2"),
                [id.to_string(), scope.tenant_id.to_string()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        row_to_objective(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_objectives(&self, scope: Scope) -> Result<Vec<Objective>, DatabaseError> {
        let reader = self.db().reader().await;
        let mut rows = reader
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM objectives WHERE tenant_id = ?1
                     ORDER BY created_at, name"
                ),
                [scope.tenant_id.to_string()],
            )
            .await?;

        let mut objectives = Vec::new();
        while let Some(row) = rows.next().await? {
            objectives.push(row_to_objective(&row)?);
        }
        Ok(objectives)
    }

    /// Apply a partial update. Fields whose value would not change are
    /// ignored; if none change, nothing is written or audited.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound`, `DatabaseError::Validation` for
    /// unwritable values, or `DatabaseError::Conflict` on a duplicate name.
    pub async fn update_objective(
        &self,
        scope: Scope,
        id: Uuid,
        proposed: &ProposedUpdate,
        comment: &str,
    ) -> Result<UpdateOutcome<Objective>, DatabaseError> {
        let current = self.get_objective(scope, id).await?;
        let changed = self.apply_diff(scope, id, &current, proposed, comment).await?;
        if changed.is_empty() {
            return Ok(UpdateOutcome {
                entity: current,
                changed,
            });
        }
        let entity = self.get_objective(scope, id).await?;
        Ok(UpdateOutcome { entity, changed })
    }

    /// Delete an objective and, by cascade, its key results.
    ///
    /// One `delete` event is recorded per removed key result, then one for
    /// the objective. Names are read inside the delete transaction; the
    /// events are enqueued after it commits.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the objective does not exist in
    /// the tenant.
    pub async fn delete_objective(
        &self,
        scope: Scope,
        id: Uuid,
        comment: &str,
    ) -> Result<(), DatabaseError> {
        let (name, children) = {
            let writer = self.db().writer().await;
            let tx = writer.transaction().await?;
            let result = delete_objective_rows(&tx, scope, id).await;
            finish(tx, result).await?
        };

        let at = now();
        let ctx = |entity_id, relation| AuditContext {
            entity_id,
            relation,
            scope,
            comment: comment.to_string(),
            at,
        };
        let mut batch: Vec<_> = children
            .iter()
            .map(|(kr_id, kr_name)| delete_event(&ctx(*kr_id, RelationKind::KeyResult), kr_name))
            .collect();
        batch.push(delete_event(&ctx(id, RelationKind::Objective), &name));
        self.audit().record(batch);

        tracing::info!(objective_id = %id, key_results = children.len(), "objective deleted");
        Ok(())
    }
}

/// Returns the objective name and its `(id, name)` key results as they
/// were just before removal.
async fn delete_objective_rows(
    conn: &libsql::Connection,
    scope: Scope,
    id: Uuid,
) -> Result<(String, Vec<(Uuid, String)>), DatabaseError> {
    let (id_text, tenant_text) = (id.to_string(), scope.tenant_id.to_string());

    let mut rows = conn
        .query(
            "SELECT name FROM objectives WHERE id = ?1 AND tenant_id = ?2",
            [id_text.as_str(), tenant_text.as_str()],
        )
        .await?;
    let name: String = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?
        .get(0)?;
    drop(rows);

    let mut rows = conn
        .query(
            "SELECT id, name FROM key_results WHERE objective_id = ?1 AND tenant_id = ?2
             ORDER BY name",
            [id_text.as_str(), tenant_text.as_str()],
        )
        .await?;
    let mut children = Vec::new();
    while let Some(row) = rows.next().await? {
        children.push((parse_uuid(&row.get::<String>(0)?)?, row.get::<String>(1)?));
    }
    drop(rows);

    conn.execute(
        "DELETE FROM objectives WHERE id = ?1 AND tenant_id = ?2",
        [id_text.as_str(), tenant_text.as_str()],
    )
    .await?;
    Ok((name, children))
}
