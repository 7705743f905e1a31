//! Expression types for building SQL conditions.
//!
//! This module contains the building blocks of queries: typed columns,
//! fields and projections, operators, filters and orderings.

pub mod column;
pub mod filter;
pub mod ops;
pub mod order;

pub use column::{Col, Field, FieldList};
pub use filter::Filter;
pub use ops::{Direction, FilterValue, LogicalOperator, Operator};
pub use order::Order;
