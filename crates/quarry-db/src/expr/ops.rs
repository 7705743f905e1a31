//! SQL operators, sort directions and filter operands.
//!
//! Every operator a caller may use is enumerated here. String forms are
//! parsed case-insensitively and unknown strings are rejected.

use std::{fmt, str::FromStr};

use rusqlite::types::Value;

use crate::error::DbError;

/// A predicate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// `IS NULL` and `IS NOT NULL` take no operand.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// `IN` and `NOT IN` take a sequence of operands.
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" | "EQ" => Operator::Eq,
            "!=" | "<>" | "NE" => Operator::Ne,
            ">" | "GT" => Operator::Gt,
            ">=" | "GTE" => Operator::Gte,
            "<" | "LT" => Operator::Lt,
            "<=" | "LTE" => Operator::Lte,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => return Err(DbError::invalid(format!("unknown operator '{s}'"))),
        };
        Ok(op)
    }
}

/// Operator joining the fragments of one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for LogicalOperator {
    type Err = DbError;

    /// An empty string selects the default, `AND`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "AND" => Ok(LogicalOperator::And),
            "OR" => Ok(LogicalOperator::Or),
            _ => Err(DbError::invalid(format!("unknown logical operator '{s}'"))),
        }
    }
}

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Direction {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(DbError::invalid(format!("unknown sort direction '{s}'"))),
        }
    }
}

/// The right-hand side of a filter fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// No operand; renders a unary fragment.
    Null,
    Scalar(Value),
    List(Vec<Value>),
}

impl FilterValue {
    /// A single operand; SQL NULL becomes [`FilterValue::Null`].
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::from(value.into())
    }

    pub fn list<T, I>(values: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FilterValue::Null,
            other => FilterValue::Scalar(other),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(Value::Text(value.to_owned()))
    }
}

impl<T: Into<Value>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FilterValue::scalar(v),
            None => FilterValue::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::list(values)
    }
}

macro_rules! impl_scalar_filter_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_filter_value!(bool, i8, i16, i32, i64, u8, u16, u32, f64, String);
