//! Composable WHERE predicates.
//!
//! A [`Filter`] is an immutable list of rendered fragments (`price >= ?`)
//! with a parallel list of bound values and one operator joining the
//! fragments. Every setter returns a new filter, so a partially built filter
//! can be shared and branched freely.
//!
//! ```ignore
//! let base = Filter::new(LogicalOperator::And).gte(products::PRICE, 100);
//! let cheap = base.lte(products::PRICE, 500);
//! let labelled = base.is_not_null(products::LABEL);
//!
//! assert_eq!(cheap.query(), "price >= ? AND price <= ?");
//! assert_eq!(base.query(), "price >= ?");
//! ```

use std::{fmt, marker::PhantomData};

use rusqlite::types::Value;

use crate::{
    error::{DbError, Result},
    expr::{
        column::{Col, Field},
        ops::{FilterValue, LogicalOperator, Operator},
    },
    traits::Entity,
};

pub struct Filter<E> {
    operator: LogicalOperator,
    fragments: Vec<String>,
    values: Vec<Value>,
    // First malformed fragment, reported by terminal calls.
    invalid: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Filter<E> {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            fragments: Vec::new(),
            values: Vec::new(),
            invalid: None,
            _entity: PhantomData,
        }
    }

    /// Returns a new filter with one more fragment on `field`.
    ///
    /// - a unary operator, or `FilterValue::Null` with `=`/`!=`, renders
    ///   `field IS [NOT] NULL` without a bound value
    /// - `IN`/`NOT IN` renders one placeholder per value, in input order; an
    ///   empty list renders a constant predicate instead
    /// - any other operator renders `field <op> ?` with one bound value
    ///
    /// Operand shapes that do not fit the operator mark the filter invalid;
    /// see [`Filter::validate`].
    pub fn set_field(&self, field: Field<E>, op: Operator, value: impl Into<FilterValue>) -> Self {
        let mut next = self.clone();
        let name = field.as_str();

        match (op, value.into()) {
            (op, FilterValue::Null) if op.is_unary() => next.push(format!("{name} {op}"), vec![]),
            (op, _) if op.is_unary() => {
                next.reject(format!("operator {op} on '{name}' takes no value"))
            }
            (Operator::Eq, FilterValue::Null) => next.push(format!("{name} IS NULL"), vec![]),
            (Operator::Ne, FilterValue::Null) => next.push(format!("{name} IS NOT NULL"), vec![]),
            (op, FilterValue::Null) => {
                next.reject(format!("operator {op} on '{name}' requires a value"))
            }
            (op, FilterValue::List(values)) if op.is_membership() => {
                next.push_membership(name, op, values)
            }
            (op, FilterValue::Scalar(value)) if op.is_membership() => {
                next.push_membership(name, op, vec![value])
            }
            (op, FilterValue::List(_)) => {
                next.reject(format!("operator {op} on '{name}' takes a single value"))
            }
            (op, FilterValue::Scalar(value)) => next.push(format!("{name} {op} ?"), vec![value]),
        }

        next
    }

    /// Typed form of [`Filter::set_field`].
    pub fn set<T>(&self, col: Col<E, T>, op: Operator, value: impl Into<FilterValue>) -> Self {
        self.set_field(col.field(), op, value)
    }

    pub fn eq<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Eq, value)
    }

    pub fn ne<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Ne, value)
    }

    pub fn gt<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Gt, value)
    }

    pub fn gte<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Gte, value)
    }

    pub fn lt<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Lt, value)
    }

    pub fn lte<T>(&self, col: Col<E, T>, value: impl Into<FilterValue>) -> Self {
        self.set(col, Operator::Lte, value)
    }

    /// `LIKE` with the pattern bound as given; include `%` wildcards yourself.
    pub fn like<T>(&self, col: Col<E, T>, pattern: impl Into<String>) -> Self {
        self.set(col, Operator::Like, pattern.into())
    }

    pub fn not_like<T>(&self, col: Col<E, T>, pattern: impl Into<String>) -> Self {
        self.set(col, Operator::NotLike, pattern.into())
    }

    pub fn is_in<T, V, I>(&self, col: Col<E, T>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.set(col, Operator::In, FilterValue::list(values))
    }

    pub fn not_in<T, V, I>(&self, col: Col<E, T>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.set(col, Operator::NotIn, FilterValue::list(values))
    }

    pub fn is_null<T>(&self, col: Col<E, T>) -> Self {
        self.set(col, Operator::IsNull, FilterValue::Null)
    }

    pub fn is_not_null<T>(&self, col: Col<E, T>) -> Self {
        self.set(col, Operator::IsNotNull, FilterValue::Null)
    }

    /// Appends `other` as a single parenthesised fragment, e.g. an OR group
    /// inside an AND filter.
    pub fn group(&self, other: &Filter<E>) -> Self {
        let mut next = self.clone();
        if let Some(reason) = &other.invalid {
            next.reject(reason.clone());
        } else if !other.is_empty() {
            next.push(format!("({})", other.query()), other.values.clone());
        }
        next
    }

    /// Fragments joined by the filter's operator.
    pub fn query(&self) -> String {
        self.fragments
            .join(&format!(" {} ", self.operator.as_sql()))
    }

    /// Bound values, aligned with the `?` placeholders of [`Filter::query`].
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Fails if any fragment was built from an operand that does not fit
    /// its operator.
    pub fn validate(&self) -> Result<()> {
        match &self.invalid {
            Some(reason) => Err(DbError::InvalidArgument(reason.clone())),
            None => Ok(()),
        }
    }

    fn push(&mut self, fragment: String, values: Vec<Value>) {
        self.fragments.push(fragment);
        self.values.extend(values);
    }

    fn push_membership(&mut self, name: &str, op: Operator, values: Vec<Value>) {
        if values.is_empty() {
            let constant = if op == Operator::In { "1 = 0" } else { "1 = 1" };
            self.push(constant.to_string(), vec![]);
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.push(format!("{name} {op} ({placeholders})"), values);
    }

    fn reject(&mut self, reason: String) {
        self.invalid.get_or_insert(reason);
    }
}

impl<E: Entity> Filter<E> {
    /// Primary-key equality, as used by the by-id commands.
    pub fn by_primary_key(id: impl Into<Value>) -> Self {
        Self::default().set_field(Field::primary_key(), Operator::Eq, FilterValue::scalar(id))
    }
}

impl<E> Default for Filter<E> {
    fn default() -> Self {
        Self::new(LogicalOperator::And)
    }
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Self {
            operator: self.operator,
            fragments: self.fragments.clone(),
            values: self.values.clone(),
            invalid: self.invalid.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("operator", &self.operator)
            .field("query", &self.query())
            .field("values", &self.values)
            .field("invalid", &self.invalid)
            .finish()
    }
}
