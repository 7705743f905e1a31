use rusqlite::types::Value;
use tracing::trace;

use crate::{
    error::{DbError, Result},
    expr::{FieldList, Filter},
    query::Statement,
    traits::Entity,
};

/// `UPDATE ... SET` of an explicit field list, always bounded by a filter.
pub struct UpdateQuery<'a, E> {
    entity: &'a E,
    fields: FieldList<E>,
    filter: Filter<E>,
}

impl<'a, E: Entity> UpdateQuery<'a, E> {
    pub fn new(entity: &'a E, fields: FieldList<E>, filter: Filter<E>) -> Self {
        Self {
            entity,
            fields,
            filter,
        }
    }

    /// Renders `UPDATE t SET a = ?, b = ? WHERE <filter>`.
    ///
    /// SET values are read from the entity in field order and precede the
    /// filter's values.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] if the field list or the filter
    /// is empty, or the filter is malformed.
    pub fn build(&self) -> Result<Statement> {
        let schema = E::schema();
        if self.fields.is_empty() {
            return Err(DbError::invalid(format!(
                "no fields to update in {}",
                schema.table
            )));
        }
        if self.filter.is_empty() {
            return Err(DbError::invalid(format!(
                "refusing to update every row of {}",
                schema.table
            )));
        }
        self.filter.validate()?;

        let mut sets = Vec::with_capacity(self.fields.len());
        let mut params: Vec<Value> = Vec::with_capacity(self.fields.len() + self.filter.len());
        for field in self.fields.iter() {
            let column = schema.column(field.as_str()).ok_or_else(|| {
                DbError::invalid(format!("unknown field '{}' for {}", field, schema.table))
            })?;
            sets.push(format!("{} = ?", column.name));
            params.push((column.value)(self.entity));
        }
        params.extend_from_slice(self.filter.values());

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            schema.table,
            sets.join(", "),
            self.filter.query()
        );

        trace!(sql = sql.as_str(), "rendered update");
        Ok(Statement::new(sql, params))
    }
}
