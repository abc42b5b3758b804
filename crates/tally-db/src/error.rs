//! Database error types for tally-db.

use tally_core::analytics::Facet;
use thiserror::Error;

/// Errors from persistence, mutation and aggregation.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// No row matched `(id, tenant)`. Also returned when a row vanished
    /// between load and write.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint rejected the write (e.g. duplicate name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A proposed value cannot be written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An analytics facet failed; no partial result is returned.
    #[error("Analytics facet '{facet}' failed: {source}")]
    Aggregation {
        facet: Facet,
        #[source]
        source: Box<DatabaseError>,
    },

    /// A SQL query failed or returned unparsable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether this is the distinct not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
