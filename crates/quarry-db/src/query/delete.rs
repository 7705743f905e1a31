use tracing::trace;

use crate::{
    error::{DbError, Result},
    expr::Filter,
    query::Statement,
    traits::Entity,
};

/// `DELETE FROM` bounded by a filter.
pub struct DeleteQuery<E> {
    filter: Filter<E>,
}

impl<E: Entity> DeleteQuery<E> {
    pub fn new(filter: Filter<E>) -> Self {
        Self {
            filter,
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] for an empty or malformed filter.
    pub fn build(&self) -> Result<Statement> {
        let table = E::schema().table;
        if self.filter.is_empty() {
            return Err(DbError::invalid(format!(
                "refusing to delete every row of {table}"
            )));
        }
        self.filter.validate()?;

        let sql = format!("DELETE FROM {} WHERE {}", table, self.filter.query());

        trace!(sql = sql.as_str(), "rendered delete");
        Ok(Statement::new(sql, self.filter.values().to_vec()))
    }
}
