//! Key result repository: CRUD, contributors, audit events.
//!
//! A key result and its contributor rows are always read under one reader
//! guard and written in one transaction, so nobody observes a half-replaced
//! contributor set.

use std::collections::HashSet;

use uuid::Uuid;

use tally_core::audit::{AuditContext, create_event, delete_event};
use tally_core::entities::{KeyResult, NewKeyResult};
use tally_core::enums::{Priority, RelationKind};
use tally_core::identity::Scope;
use tally_core::proposed::ProposedUpdate;
use tally_core::value::at_storage_precision;

use crate::error::DatabaseError;
use crate::helpers::{
    classify_write_error, format_datetime, get_opt_string, opt_datetime_value, opt_uuid_value,
    parse_datetime, parse_enum, parse_optional_datetime, parse_optional_uuid, parse_uuid,
};
use crate::mutation::{finish, replace_contributors};
use crate::service::{TallyService, UpdateOutcome, now};

const ENTITY: &str = "key_result";

const SELECT_COLS: &str = "id, tenant_id, objective_id, name, description, priority, unit, start_value, target_value, current_value, lead_id, team_id, due_date, created_by, created_at, updated_at";

/// Parse a row; `contributors` is filled in separately.
fn row_to_key_result(row: &libsql::Row) -> Result<KeyResult, DatabaseError> {
    Ok(KeyResult {
        id: parse_uuid(&row.get::<String>(0)?)?,
        tenant_id: parse_uuid(&row.get::<String>(1)?)?,
        objective_id: parse_uuid(&row.get::<String>(2)?)?,
        name: row.get(3)?,
        description: row.get(4)?,
        priority: parse_enum(&row.get::<String>(5)?)?,
        unit: row.get(6)?,
        start_value: row.get(7)?,
        target_value: row.get(8)?,
        current_value: row.get(9)?,
        lead_id: parse_optional_uuid(get_opt_string(row, 10)?.as_deref())?,
        team_id: parse_optional_uuid(get_opt_string(row, 11)?.as_deref())?,
        due_date: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
        contributors: Vec::new(),
        created_by: parse_uuid(&row.get::<String>(13)?)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    })
}

async fn load_contributors(
    conn: &libsql::Connection,
    key_result_id: &str,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT user_id FROM key_result_contributors WHERE key_result_id = ?1
             ORDER BY position",
            [key_result_id],
        )
        .await?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next().await? {
        ids.push(parse_uuid(&row.get::<String>(0)?)?);
    }
    Ok(ids)
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn validate_new(new: &NewKeyResult) -> Result<(), DatabaseError> {
    if new.name.trim().is_empty() {
        return Err(DatabaseError::Validation("key result name must not be blank".into()));
    }
    let values = [
        ("startValue", Some(new.start_value)),
        ("targetValue", Some(new.target_value)),
        ("currentValue", new.current_value),
    ];
    for (field, value) in values {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(DatabaseError::Validation(format!(
                "'{field}': {v} is not a finite number"
            )));
        }
    }
    Ok(())
}

impl TallyService {
    /// Create a key result under an objective of the caller's tenant.
    ///
    /// `current_value` defaults to `start_value`. Duplicate contributors
    /// are collapsed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the objective does not exist in
    /// the tenant, `DatabaseError::Validation` for a blank name or
    /// non-finite values, and `DatabaseError::Conflict` for a name already
    /// used under the objective.
    pub async fn create_key_result(
        &self,
        scope: Scope,
        new: NewKeyResult,
        comment: &str,
    ) -> Result<KeyResult, DatabaseError> {
        validate_new(&new)?;

        let now = now();
        let key_result = KeyResult {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            objective_id: new.objective_id,
            current_value: new.current_value.unwrap_or(new.start_value),
            name: new.name,
            description: new.description,
            priority: new.priority.unwrap_or(Priority::None),
            unit: new.unit,
            start_value: new.start_value,
            target_value: new.target_value,
            lead_id: new.lead_id,
            team_id: new.team_id,
            due_date: new.due_date.map(at_storage_precision),
            contributors: dedup(&new.contributors),
            created_by: scope.actor_id,
            created_at: now,
            updated_at: now,
        };

        {
            let writer = self.db().writer().await;
            let tx = writer.transaction().await?;
            let result = insert_key_result(&tx, &key_result).await;
            finish(tx, result).await?;
        }

        let rendered =
            serde_json::to_string(&key_result).map_err(|e| DatabaseError::Other(e.into()))?;
        self.audit().record(vec![create_event(
            &AuditContext {
                entity_id: key_result.id,
                relation: RelationKind::KeyResult,
                scope,
                comment: comment.to_string(),
                at: now,
            },
            rendered,
        )]);

        tracing::info!(
            key_result_id = %key_result.id,
            objective_id = %key_result.objective_id,
            name = %key_result.name,
            "key result created"
        );
        Ok(key_result)
    }

    /// Load one key result with its contributors.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no key result with this id
    /// exists in the tenant.
    pub async fn get_key_result(&self, scope: Scope, id: Uuid) -> Result<KeyResult, DatabaseError> {
        let id_text = id.to_string();
        let reader = self.db().reader().await;
        let mut rows = reader
            .query(
                &format!("SELECT {SELECT_COLS} FROM key_results WHERE id = ?1 AND tenant_id = ?2"),
                [id_text.clone(), scope.tenant_id.to_string()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        let mut key_result = row_to_key_result(&row)?;
        drop(rows);

        key_result.contributors = load_contributors(&reader, &id_text).await?;
        Ok(key_result)
    }

    /// All key results of an objective, by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_key_results(
        &self,
        scope: Scope,
        objective_id: Uuid,
    ) -> Result<Vec<KeyResult>, DatabaseError> {
        let reader = self.db().reader().await;
        let mut rows = reader
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM key_results
                     WHERE objective_id = ?1 AND tenant_id = ?2
                     ORDER BY name"
                ),
                [objective_id.to_string(), scope.tenant_id.to_string()],
            )
            .await?;

        let mut key_results = Vec::new();
        while let Some(row) = rows.next().await? {
            key_results.push(row_to_key_result(&row)?);
        }
        drop(rows);

        for key_result in &mut key_results {
            key_result.contributors =
                load_contributors(&reader, &key_result.id.to_string()).await?;
        }
        Ok(key_results)
    }

    /// Contributor ids of one key result, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the key result does not exist in
    /// the tenant.
    pub async fn key_result_contributors(
        &self,
        scope: Scope,
        id: Uuid,
    ) -> Result<Vec<Uuid>, DatabaseError> {
        let id_text = id.to_string();
        let reader = self.db().reader().await;
        let mut rows = reader
            .query(
                "SELECT 1 FROM key_results WHERE id = ?1 AND tenant_id = ?2",
                [id_text.clone(), scope.tenant_id.to_string()],
            )
            .await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::not_found(ENTITY, id));
        }
        drop(rows);
        load_contributors(&reader, &id_text).await
    }

    /// Apply a partial update, including an optional contributor set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound`, `DatabaseError::Validation` for
    /// unwritable values, or `DatabaseError::Conflict` on a duplicate name.
    pub async fn update_key_result(
        &self,
        scope: Scope,
        id: Uuid,
        proposed: &ProposedUpdate,
        comment: &str,
    ) -> Result<UpdateOutcome<KeyResult>, DatabaseError> {
        let current = self.get_key_result(scope, id).await?;
        let changed = self.apply_diff(scope, id, &current, proposed, comment).await?;
        if changed.is_empty() {
            return Ok(UpdateOutcome {
                entity: current,
                changed,
            });
        }
        let entity = self.get_key_result(scope, id).await?;
        Ok(UpdateOutcome { entity, changed })
    }

    /// Delete a key result and its contributor rows.
    ///
    /// The `delete` event is built from the row read before removal and
    /// enqueued once the delete has committed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the key result does not exist in
    /// the tenant.
    pub async fn delete_key_result(
        &self,
        scope: Scope,
        id: Uuid,
        comment: &str,
    ) -> Result<(), DatabaseError> {
        let current = self.get_key_result(scope, id).await?;

        let affected = self
            .db()
            .writer()
            .await
            .execute(
                "DELETE FROM key_results WHERE id = ?1 AND tenant_id = ?2",
                [id.to_string(), scope.tenant_id.to_string()],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found(ENTITY, id));
        }

        self.audit().record(vec![delete_event(
            &AuditContext {
                entity_id: id,
                relation: RelationKind::KeyResult,
                scope,
                comment: comment.to_string(),
                at: now(),
            },
            &current.name,
        )]);

        tracing::info!(key_result_id = %id, "key result deleted");
        Ok(())
    }
}

async fn insert_key_result(
    conn: &libsql::Connection,
    key_result: &KeyResult,
) -> Result<(), DatabaseError> {
    let objective_id = key_result.objective_id.to_string();
    let tenant_id = key_result.tenant_id.to_string();

    let mut rows = conn
        .query(
            "SELECT 1 FROM objectives WHERE id = ?1 AND tenant_id = ?2",
            [objective_id.as_str(), tenant_id.as_str()],
        )
        .await?;
    if rows.next().await?.is_none() {
        return Err(DatabaseError::not_found("objective", key_result.objective_id));
    }
    drop(rows);

    conn.execute(
        &format!(
            "INSERT INTO key_results ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        libsql::params![
            key_result.id.to_string(),
            tenant_id.as_str(),
            objective_id.as_str(),
            key_result.name.as_str(),
            key_result.description.as_str(),
            key_result.priority.as_str(),
            key_result.unit.as_str(),
            key_result.start_value,
            key_result.target_value,
            key_result.current_value,
            opt_uuid_value(key_result.lead_id),
            opt_uuid_value(key_result.team_id),
            opt_datetime_value(key_result.due_date.as_ref()),
            key_result.created_by.to_string(),
            format_datetime(&key_result.created_at),
            format_datetime(&key_result.updated_at)
        ],
    )
    .await
    .map_err(|e| classify_write_error(e, ENTITY))?;

    replace_contributors(conn, key_result.id, &key_result.contributors).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_objective, new_key_result, scope, test_service};
    use crate::updates::KeyResultUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_defaults_and_roundtrip() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let created = svc
            .create_key_result(
                scope,
                NewKeyResult {
                    start_value: 5.0,
                    contributors: vec![a, b, a],
                    ..new_key_result(objective.id, "Signups", 50.0)
                },
                "",
            )
            .await
            .unwrap();

        assert_eq!(created.current_value, 5.0);
        assert_eq!(created.priority, Priority::None);
        assert_eq!(created.contributors, vec![a, b]);

        let fetched = svc.get_key_result(scope, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_requires_objective_in_tenant() {
        let svc = test_service().await;
        let objective = create_objective(&svc, scope(), "Theirs").await;

        let err = svc
            .create_key_result(scope(), new_key_result(objective.id, "Sneaky", 1.0), "")
            .await
            .unwrap_err();
        assert!(
            matches!(err, DatabaseError::NotFound { entity: "objective", .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn duplicate_name_under_objective_is_conflict() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        svc.create_key_result(scope, new_key_result(objective.id, "Same", 1.0), "")
            .await
            .unwrap();

        let err = svc
            .create_key_result(scope, new_key_result(objective.id, "Same", 2.0), "")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn non_finite_values_are_rejected() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;

        let err = svc
            .create_key_result(scope, new_key_result(objective.id, "Bad", f64::INFINITY), "")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn contributors_replaced_and_listed() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let kr = svc
            .create_key_result(
                scope,
                NewKeyResult {
                    contributors: vec![a, b],
                    ..new_key_result(objective.id, "Signups", 10.0)
                },
                "",
            )
            .await
            .unwrap();

        let update = KeyResultUpdateBuilder::new().contributors(vec![b, c]).build();
        let outcome = svc.update_key_result(scope, kr.id, &update, "").await.unwrap();

        assert_eq!(outcome.changed, ["contributors"]);
        assert_eq!(outcome.entity.contributors, vec![b, c]);
        assert_eq!(svc.key_result_contributors(scope, kr.id).await.unwrap(), vec![b, c]);
    }

    #[tokio::test]
    async fn reordered_contributors_are_a_noop() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let kr = svc
            .create_key_result(
                scope,
                NewKeyResult {
                    contributors: vec![a, b],
                    ..new_key_result(objective.id, "Signups", 10.0)
                },
                "",
            )
            .await
            .unwrap();

        let update = KeyResultUpdateBuilder::new().contributors(vec![b, a]).build();
        let outcome = svc.update_key_result(scope, kr.id, &update, "").await.unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.entity.updated_at, kr.updated_at);
    }

    #[tokio::test]
    async fn list_orders_by_name() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        for name in ["b", "c", "a"] {
            svc.create_key_result(scope, new_key_result(objective.id, name, 1.0), "")
                .await
                .unwrap();
        }

        let names: Vec<String> = svc
            .list_key_results(scope, objective.id)
            .await
            .unwrap()
            .into_iter()
            .map(|kr| kr.name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_removes_contributors_too() {
        let svc = test_service().await;
        let scope = scope();
        let objective = create_objective(&svc, scope, "Grow").await;
        let kr = svc
            .create_key_result(
                scope,
                NewKeyResult {
                    contributors: vec![Uuid::new_v4()],
                    ..new_key_result(objective.id, "Gone", 1.0)
                },
                "",
            )
            .await
            .unwrap();

        svc.delete_key_result(scope, kr.id, "").await.unwrap();

        assert!(svc.get_key_result(scope, kr.id).await.unwrap_err().is_not_found());
        let mut rows = svc
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM key_result_contributors WHERE key_result_id = ?1",
                [kr.id.to_string()],
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn contributors_of_other_tenant_are_not_found() {
        let svc = test_service().await;
        let owner = scope();
        let objective = create_objective(&svc, owner, "Grow").await;
        let kr = svc
            .create_key_result(owner, new_key_result(objective.id, "Mine", 1.0), "")
            .await
            .unwrap();

        let err = svc.key_result_contributors(scope(), kr.id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
