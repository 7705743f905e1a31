//! Repository pattern implementations for database operations.
//!
//! Repositories pair the statement builders in [`crate::query`] with an
//! [`Executor`](crate::Executor):
//!
//! - [`QueryRepository`] - immutable read side: `list`, `one`, `count`
//! - [`CommandRepository`] - writes: insert, update and delete

pub mod command;
pub mod query;

pub use command::{CommandRepository, InsertResult};
pub use query::QueryRepository;
