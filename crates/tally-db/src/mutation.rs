//! Atomic update applier.
//!
//! Turns a [`FieldDiff`] into one tenant-scoped `UPDATE` (plus the
//! contributor rewrite for key results) inside a single transaction.
//! Values that cannot be written are rejected before any statement runs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_core::diff::FieldDiff;
use tally_core::enums::{ObjectiveStatus, Priority, RelationKind};
use tally_core::field::{Field, FieldName};
use tally_core::value::FieldValue;

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{classify_write_error, format_datetime, opt_datetime_value, opt_uuid_value};

/// SQL table holding rows of the given entity kind.
pub(crate) const fn table_for(relation: RelationKind) -> &'static str {
    match relation {
        RelationKind::Objective => "objectives",
        RelationKind::KeyResult => "key_results",
    }
}

/// A validated change set, ready to bind.
#[derive(Debug, Default)]
pub(crate) struct PreparedUpdate {
    pub assignments: Vec<(&'static str, libsql::Value)>,
    pub contributors: Option<Vec<Uuid>>,
}

/// Validate every changed field and convert it to a column binding.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` for an unknown field, a field the
/// entity does not have, a value of the wrong kind, invalid enum text, a
/// blank name or a non-finite number.
pub(crate) fn prepare(
    relation: RelationKind,
    diff: &FieldDiff,
) -> Result<PreparedUpdate, DatabaseError> {
    let mut prepared = PreparedUpdate {
        assignments: Vec::with_capacity(diff.fields.len()),
        contributors: diff.contributors.clone(),
    };

    for (name, value) in &diff.fields {
        let field = match name {
            FieldName::Known(field) if field.belongs_to(relation) => *field,
            FieldName::Known(field) => {
                return Err(DatabaseError::Validation(format!(
                    "field '{field}' does not exist on {relation}"
                )));
            }
            FieldName::Unknown(raw) => {
                return Err(DatabaseError::Validation(format!(
                    "unknown field '{raw}' on {relation}"
                )));
            }
        };
        let Some(column) = field.column() else {
            return Err(DatabaseError::Validation(format!(
                "'{field}' must be a list of ids"
            )));
        };
        prepared.assignments.push((column, bind(field, value)?));
    }

    Ok(prepared)
}

fn bind(field: Field, value: &FieldValue) -> Result<libsql::Value, DatabaseError> {
    let invalid = |reason: String| DatabaseError::Validation(format!("'{field}': {reason}"));

    if value.kind() != Some(field.kind()) {
        return Err(invalid(format!(
            "expected {:?} value, got {}",
            field.kind(),
            value.render()
        )));
    }

    Ok(match (field, value) {
        (Field::Status, FieldValue::Text(text)) => text
            .parse::<ObjectiveStatus>()
            .map_err(|e| invalid(e.to_string()))?
            .as_str()
            .into(),
        (Field::Priority, FieldValue::Text(text)) => text
            .parse::<Priority>()
            .map_err(|e| invalid(e.to_string()))?
            .as_str()
            .into(),
        (Field::Name, FieldValue::Text(text)) if text.trim().is_empty() => {
            return Err(invalid("name must not be blank".into()));
        }
        (_, FieldValue::Text(text)) => text.clone().into(),
        (_, FieldValue::Number(n)) if !n.is_finite() => {
            return Err(invalid(format!("{n} is not a finite number")));
        }
        (_, FieldValue::Number(n)) => libsql::Value::Real(*n),
        (_, FieldValue::Timestamp(ts)) => opt_datetime_value(ts.as_ref()),
        (_, FieldValue::Reference(id)) => opt_uuid_value(*id),
        (_, FieldValue::ReferenceSet(_) | FieldValue::Raw(_)) => {
            return Err(invalid("value cannot be written".into()));
        }
    })
}

/// Commit on `Ok`, roll back on `Err`, and hand the result through.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "transaction rollback failed");
            }
            Err(e)
        }
    }
}

/// Replace the full contributor set of a key result.
pub(crate) async fn replace_contributors(
    conn: &libsql::Connection,
    key_result_id: Uuid,
    contributors: &[Uuid],
) -> Result<(), DatabaseError> {
    let id = key_result_id.to_string();
    conn.execute(
        "DELETE FROM key_result_contributors WHERE key_result_id = ?1",
        [id.as_str()],
    )
    .await?;
    for (position, user_id) in contributors.iter().enumerate() {
        conn.execute(
            "INSERT INTO key_result_contributors (key_result_id, user_id, position)
             VALUES (?1, ?2, ?3)",
            libsql::params![id.as_str(), user_id.to_string(), position as i64],
        )
        .await?;
    }
    Ok(())
}

impl TallyDb {
    /// Write a prepared change set for one entity in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no row matches `(id, tenant)`
    /// (the transaction is rolled back), `DatabaseError::Conflict` on a
    /// uniqueness violation, or the underlying libSQL error.
    pub(crate) async fn apply_update(
        &self,
        relation: RelationKind,
        entity_id: Uuid,
        tenant_id: Uuid,
        prepared: &PreparedUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let writer = self.writer().await;
        let tx = writer.transaction().await?;
        let result = write_update(&tx, relation, entity_id, tenant_id, prepared, now).await;
        finish(tx, result).await
    }
}

async fn write_update(
    conn: &libsql::Connection,
    relation: RelationKind,
    entity_id: Uuid,
    tenant_id: Uuid,
    prepared: &PreparedUpdate,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let mut sets = Vec::with_capacity(prepared.assignments.len() + 1);
    let mut params: Vec<libsql::Value> = Vec::with_capacity(prepared.assignments.len() + 3);
    let mut idx = 1usize;

    for (column, value) in &prepared.assignments {
        sets.push(format!("{column} = ?{idx}"));
        params.push(value.clone());
        idx += 1;
    }
    sets.push(format!("updated_at = ?{idx}"));
    params.push(format_datetime(&now).into());
    idx += 1;

    params.push(entity_id.to_string().into());
    params.push(tenant_id.to_string().into());
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{idx} AND tenant_id = ?{}",
        table_for(relation),
        sets.join(", "),
        idx + 1
    );

    let affected = conn
        .execute(&sql, libsql::params_from_iter(params))
        .await
        .map_err(|e| classify_write_error(e, relation.as_str()))?;
    if affected == 0 {
        return Err(DatabaseError::not_found(relation.as_str(), entity_id));
    }

    if let Some(contributors) = &prepared.contributors {
        replace_contributors(conn, entity_id, contributors).await?;
    }
    Ok(())
}
