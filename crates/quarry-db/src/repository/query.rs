//! Read-side repository.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::{DbError, Result},
    expr::{Field, FieldList, Filter, Order},
    query::{Pagination, SelectQuery, Statement},
    traits::{Entity, Executor},
};

/// An immutable read repository for entity `E` over executor `D`.
///
/// Mutators return a new repository carrying the same executor handle, so a
/// configured repository can be branched and reused. Terminal calls
/// ([`list`](Self::list), [`one`](Self::one), [`count`](Self::count)) leave
/// the repository untouched and may be repeated.
///
/// ```ignore
/// let repo = QueryRepository::<Product, _>::new(db);
/// let page = repo
///     .filter(Filter::default().gte(products::PRICE, 100))
///     .order_by([products::PRICE.asc()])
///     .paginate(Pagination::new(2, 5)?)
///     .list(&ctx)?;
/// ```
pub struct QueryRepository<E, D> {
    db: D,
    query: SelectQuery<E>,
}

impl<E: Entity, D: Executor + Clone> QueryRepository<E, D> {
    pub fn new(db: D) -> Self {
        Self {
            db,
            query: SelectQuery::new(),
        }
    }

    fn with_query(&self, query: SelectQuery<E>) -> Self {
        Self {
            db: self.db.clone(),
            query,
        }
    }

    /// Replaces the projection. An empty list selects every column.
    pub fn select(&self, fields: impl IntoIterator<Item = Field<E>>) -> Self {
        self.with_query(self.query.select(fields))
    }

    /// Projects every column except `fields`.
    pub fn exclude(&self, fields: impl IntoIterator<Item = Field<E>>) -> Self {
        self.with_query(self.query.exclude(fields))
    }

    pub fn filter(&self, filter: Filter<E>) -> Self {
        self.with_query(self.query.filter(filter))
    }

    pub fn paginate(&self, pagination: Pagination) -> Self {
        self.with_query(self.query.paginate(pagination))
    }

    pub fn order_by(&self, orders: impl IntoIterator<Item = Order<E>>) -> Self {
        self.with_query(self.query.order_by(orders))
    }

    /// The projection `list` returns.
    pub fn fields(&self) -> FieldList<E> {
        self.query.fields()
    }

    /// Renders the statement `list` would run.
    pub fn render_list(&self) -> Result<Statement> {
        self.query.build()
    }

    /// Renders the statement `count` would run.
    pub fn render_count(&self) -> Result<Statement> {
        self.query.build_count()
    }

    /// Runs the query and returns every matching row. No match is an empty
    /// list, not an error.
    ///
    /// # Errors
    ///
    /// - [`DbError::Cancelled`] if `ctx` is already cancelled
    /// - [`DbError::InvalidArgument`] for a malformed filter
    /// - [`DbError::QueryError`] if the store rejects the statement
    pub fn list(&self, ctx: &CancellationToken) -> Result<Vec<E>> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        let stmt = self.render_list()?;
        let rows: Vec<E> = self.db.select(ctx, &stmt.sql, &stmt.args)?;
        debug!(table = E::schema().table, rows = rows.len(), "listed rows");
        Ok(rows)
    }

    /// Returns the first row of [`list`](Self::list).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] when nothing matches, plus every error
    /// `list` can return.
    pub fn one(&self, ctx: &CancellationToken) -> Result<E> {
        self.list(ctx)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound(E::schema().table.to_string()))
    }

    /// Counts matching rows. Projection, ordering and pagination are ignored.
    pub fn count(&self, ctx: &CancellationToken) -> Result<u64> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        let stmt = self.render_count()?;
        let count = self.db.query_scalar(ctx, &stmt.sql, &stmt.args)?;
        u64::try_from(count)
            .map_err(|_| DbError::UnexpectedResult(format!("negative row count {count}")))
    }
}

impl<E, D: Clone> Clone for QueryRepository<E, D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            query: self.query.clone(),
        }
    }
}
