//! # tally-db
//!
//! libSQL persistence for Tally: objectives, key results, contributors and
//! the audit trail, plus the mutation pipeline and the analytics aggregator
//! that run on top of it.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode. One
//! connection is shared by the whole process; [`TallyDb::reader`] and
//! [`TallyDb::writer`] gate access to it so a reader never observes a
//! transaction half-way through.

pub mod analytics;
pub mod audit;
pub mod error;
pub mod helpers;
mod migrations;
pub(crate) mod mutation;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{RwLockReadGuard, RwLockWriteGuard};

pub use audit::{AuditPage, AuditRecorder, AuditSink, AuditStore};
pub use service::TallyService;

/// Central database handle for all Tally state.
pub struct TallyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    gate: tokio::sync::RwLock<()>,
}

/// Shared access to the connection for read-only queries.
pub struct Reader<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    conn: &'a libsql::Connection,
}

/// Exclusive access to the connection for transactions and appends.
pub struct Writer<'a> {
    _guard: RwLockWriteGuard<'a, ()>,
    conn: &'a libsql::Connection,
}

impl Deref for Reader<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl Deref for Writer<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl TallyDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tally_db = Self {
            db,
            conn,
            gate: tokio::sync::RwLock::new(()),
        };
        tally_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(tally_db)
    }

    /// The raw connection, bypassing the gate. For migrations and tests.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Acquire shared read access. Many readers may hold it at once.
    pub async fn reader(&self) -> Reader<'_> {
        Reader {
            _guard: self.gate.read().await,
            conn: &self.conn,
        }
    }

    /// Acquire exclusive write access.
    ///
    /// Never call [`Self::reader`] while holding a writer on the same task;
    /// the gate is not reentrant.
    pub async fn writer(&self) -> Writer<'_> {
        Writer {
            _guard: self.gate.write().await,
            conn: &self.conn,
        }
    }
}
