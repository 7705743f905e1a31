//! Statement rendering.
//!
//! This module turns builder state into SQL text plus positional arguments
//! without touching a database. Each statement kind has its own builder:
//!
//! - [`SelectQuery`]: `SELECT` and `SELECT count(1)` with projection,
//!   filter, ordering and pagination.
//! - [`InsertQuery`]: one multi-row `INSERT INTO` over the non-generated
//!   columns.
//! - [`UpdateQuery`]: `UPDATE ... SET` for an explicit field list.
//! - [`DeleteQuery`]: `DELETE FROM` with a filter.
//!
//! The repositories in [`crate::repository`] render through these builders
//! and hand the resulting [`Statement`] to an [`Executor`](crate::Executor).
//!
//! # Example
//!
//! ```ignore
//! let stmt = SelectQuery::<Product>::new()
//!     .filter(Filter::default().gte(products::PRICE, 100))
//!     .order_by([products::PRICE.asc()])
//!     .paginate(Pagination::new(2, 5)?)
//!     .build()?;
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT product_id, name, price, qty, label FROM products \
//!      WHERE price >= ? ORDER BY price ASC LIMIT 5 OFFSET 5"
//! );
//! ```

use std::fmt;

use rusqlite::types::Value;

pub mod delete;
pub mod insert;
pub mod pagination;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use pagination::Pagination;
pub use select::SelectQuery;
pub use update::UpdateQuery;

/// Rendered SQL with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
