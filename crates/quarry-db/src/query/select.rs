//! SELECT rendering.

use std::fmt;

use tracing::trace;

use crate::{
    error::Result,
    expr::{Field, FieldList, Filter, Order},
    query::{Pagination, Statement},
    traits::Entity,
};

/// An immutable SELECT builder for entity `E`.
///
/// Every setter returns a new builder with that one option replaced; the
/// receiver is left untouched. Options are replaced wholesale: a second
/// [`SelectQuery::filter`] call discards the first filter rather than
/// combining with it.
pub struct SelectQuery<E> {
    fields: FieldList<E>,
    filter: Filter<E>,
    orders: Vec<Order<E>>,
    pagination: Option<Pagination>,
}

impl<E: Entity> SelectQuery<E> {
    pub fn new() -> Self {
        Self {
            fields: FieldList::new(),
            filter: Filter::default(),
            orders: Vec::new(),
            pagination: None,
        }
    }

    /// Projects exactly `fields`. An empty projection selects every column.
    pub fn select(&self, fields: impl IntoIterator<Item = Field<E>>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            ..self.clone()
        }
    }

    /// Projects every column except `fields`, keeping schema order.
    pub fn exclude(&self, fields: impl IntoIterator<Item = Field<E>>) -> Self {
        let excluded: Vec<Field<E>> = fields.into_iter().collect();
        Self {
            fields: FieldList::all_except(&excluded),
            ..self.clone()
        }
    }

    pub fn filter(&self, filter: Filter<E>) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }

    pub fn paginate(&self, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..self.clone()
        }
    }

    pub fn order_by(&self, orders: impl IntoIterator<Item = Order<E>>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
            ..self.clone()
        }
    }

    /// The projection the query renders.
    pub fn fields(&self) -> FieldList<E> {
        if self.fields.is_empty() {
            FieldList::all()
        } else {
            self.fields.clone()
        }
    }

    /// Renders `SELECT <fields> FROM <table> [WHERE] [ORDER BY] [LIMIT/OFFSET]`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`](crate::DbError::InvalidArgument)
    /// if the filter holds a malformed fragment.
    pub fn build(&self) -> Result<Statement> {
        self.filter.validate()?;

        let mut params = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.fields().names().join(", "),
            E::schema().table
        );

        self.push_where(&mut sql, &mut params);

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders = self
                .orders
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>();
            sql.push_str(&orders.join(", "));
        }

        if let Some(page) = self.pagination {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.size(), page.offset()));
        }

        trace!(sql = sql.as_str(), "rendered select");
        Ok(Statement::new(sql, params))
    }

    /// Renders `SELECT count(1) FROM <table> [WHERE]`. Projection, ordering
    /// and pagination do not apply.
    pub fn build_count(&self) -> Result<Statement> {
        self.filter.validate()?;

        let mut params = Vec::new();
        let mut sql = format!("SELECT count(1) FROM {}", E::schema().table);

        self.push_where(&mut sql, &mut params);

        trace!(sql = sql.as_str(), "rendered count");
        Ok(Statement::new(sql, params))
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<rusqlite::types::Value>) {
        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.query());
            params.extend_from_slice(self.filter.values());
        }
    }
}

impl<E: Entity> Default for SelectQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for SelectQuery<E> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            filter: self.filter.clone(),
            orders: self.orders.clone(),
            pagination: self.pagination,
        }
    }
}

impl<E> fmt::Debug for SelectQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectQuery")
            .field("fields", &self.fields)
            .field("filter", &self.filter)
            .field("orders", &self.orders)
            .field("pagination", &self.pagination)
            .finish()
    }
}
