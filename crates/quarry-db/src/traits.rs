//! Core traits that power the query builder.
//!
//! These traits define the contract for:
//! - Converting database rows into Rust types (`FromRow`)
//! - Describing an entity's table (`Entity`)
//! - Running rendered statements against a store (`Executor`)

use rusqlite::{types::Value, Row};
use tokio_util::sync::CancellationToken;

use crate::{
    connection::{ExecResult, Prepared},
    error::Result,
    schema::Schema,
};

/// A trait for types that can be constructed from a SQLite row.
///
/// This is used by [`Executor::select`] to hydrate query results.
/// Implementations generated by [`define_entity!`](crate::define_entity) fall
/// back to `Default` for columns that were not part of the projection.
///
/// # Example
///
/// ```rust
/// use quarry_db::FromRow;
/// struct User {
///     id: i64,
///     name: String
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
///         Ok(User {
///             id: row.get("id")?,
///             name: row.get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// A record stored in one flat table.
pub trait Entity: FromRow + 'static {
    /// The entity's table descriptor.
    fn schema() -> &'static Schema<Self>;
}

/// The statement-execution capability the repositories depend on.
///
/// Arguments are bound positionally to `?` placeholders. Implementations own
/// connection handling; the cancellation token is handed through untouched so
/// an implementation can refuse work for an already cancelled caller.
pub trait Executor {
    /// Validates a statement and caches it for later execution.
    fn prepare(&self, ctx: &CancellationToken, sql: &str) -> Result<Prepared>;

    /// Executes a prepared statement with the given arguments.
    fn execute(&self, ctx: &CancellationToken, stmt: &Prepared, args: &[Value])
        -> Result<ExecResult>;

    /// Runs a query and hydrates every row, in result order.
    fn select<E: FromRow>(
        &self,
        ctx: &CancellationToken,
        sql: &str,
        args: &[Value],
    ) -> Result<Vec<E>>;

    /// Runs a query returning a single integer (e.g. `count(1)`).
    fn query_scalar(&self, ctx: &CancellationToken, sql: &str, args: &[Value]) -> Result<i64>;
}
