use tracing::trace;

use crate::{
    error::{DbError, Result},
    query::Statement,
    traits::Entity,
};

/// Multi-row INSERT over the entity's non-generated columns.
pub struct InsertQuery<'a, E> {
    rows: &'a [E],
}

impl<'a, E: Entity> InsertQuery<'a, E> {
    pub fn new(rows: &'a [E]) -> Self {
        Self {
            rows,
        }
    }

    /// Renders `INSERT INTO t (a, b) VALUES (?, ?), (?, ?)` with one value
    /// group per row, values read in column order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] for an empty row list.
    pub fn build(&self) -> Result<Statement> {
        let schema = E::schema();
        if self.rows.is_empty() {
            return Err(DbError::invalid(format!(
                "nothing to insert into {}",
                schema.table
            )));
        }

        let columns: Vec<_> = schema.insertable().collect();
        let names = columns.iter().map(|c| c.name).collect::<Vec<_>>();
        let group = format!("({})", vec!["?"; columns.len()].join(", "));

        let mut params = Vec::with_capacity(columns.len() * self.rows.len());
        for row in self.rows {
            params.extend(columns.iter().map(|c| (c.value)(row)));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            schema.table,
            names.join(", "),
            vec![group.as_str(); self.rows.len()].join(", ")
        );

        trace!(sql = sql.as_str(), rows = self.rows.len(), "rendered insert");
        Ok(Statement::new(sql, params))
    }
}
