//! SQLite statement execution.
//!
//! [`SqliteExecutor`] is the [`Executor`] used by the repositories. It shares
//! one connection behind a mutex and relies on rusqlite's prepared-statement
//! cache, so a statement prepared once is reused by later executions of the
//! same SQL text.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::{params_from_iter, types::Value, Connection};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::{DbError, Result},
    traits::{Executor, FromRow},
};

/// A statement that has been validated and cached by an [`Executor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    sql: String,
    parameter_count: usize,
}

impl Prepared {
    pub fn new(sql: impl Into<String>, parameter_count: usize) -> Self {
        Self {
            sql: sql.into(),
            parameter_count,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of positional parameters the statement expects.
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub rows_affected: usize,
    /// Row id of the most recent successful INSERT on the connection.
    pub last_insert_id: i64,
}

/// Shared SQLite connection implementing [`Executor`].
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Opens (or creates) the database file at `path` in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConnectionError`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn =
            Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;

        // WAL mode for better concurrent access
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        debug!(path = %path.display(), "opened database");
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Sets how long a statement waits on a locked database before failing.
    pub fn with_busy_timeout(self, timeout: Duration) -> Result<Self> {
        self.conn
            .lock()
            .map_err(|_| poisoned())?
            .busy_timeout(timeout)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(self)
    }

    /// Runs a batch of semicolon separated statements without parameters.
    pub fn execute_batch(&self, ctx: &CancellationToken, sql: &str) -> Result<()> {
        let conn = self.lock(ctx)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self, ctx: &CancellationToken) -> Result<MutexGuard<'_, Connection>> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        self.conn.lock().map_err(|_| poisoned())
    }
}

fn poisoned() -> DbError {
    DbError::ConnectionError("connection lock poisoned".into())
}

impl Executor for SqliteExecutor {
    fn prepare(&self, ctx: &CancellationToken, sql: &str) -> Result<Prepared> {
        let conn = self.lock(ctx)?;
        let stmt = conn.prepare_cached(sql)?;
        trace!(sql, "prepared statement");
        Ok(Prepared::new(sql, stmt.parameter_count()))
    }

    fn execute(
        &self,
        ctx: &CancellationToken,
        stmt: &Prepared,
        args: &[Value],
    ) -> Result<ExecResult> {
        if args.len() != stmt.parameter_count() {
            return Err(DbError::invalid(format!(
                "statement expects {} arguments, got {}",
                stmt.parameter_count(),
                args.len()
            )));
        }

        let conn = self.lock(ctx)?;
        let mut cached = conn.prepare_cached(stmt.sql())?;
        debug!(sql = stmt.sql(), args = args.len(), "executing statement");

        let rows_affected = cached.execute(params_from_iter(args.iter()))?;
        Ok(ExecResult {
            rows_affected,
            last_insert_id: conn.last_insert_rowid(),
        })
    }

    fn select<E: FromRow>(
        &self,
        ctx: &CancellationToken,
        sql: &str,
        args: &[Value],
    ) -> Result<Vec<E>> {
        let conn = self.lock(ctx)?;
        let mut stmt = conn.prepare_cached(sql)?;
        debug!(sql, args = args.len(), "running query");

        let rows = stmt.query_map(params_from_iter(args.iter()), E::from_row)?;
        let entities = rows.collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(entities)
    }

    fn query_scalar(&self, ctx: &CancellationToken, sql: &str, args: &[Value]) -> Result<i64> {
        let conn = self.lock(ctx)?;
        let mut stmt = conn.prepare_cached(sql)?;
        debug!(sql, args = args.len(), "running scalar query");

        let value = stmt.query_row(params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(value)
    }
}
