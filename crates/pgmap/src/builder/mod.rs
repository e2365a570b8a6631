//! Text-based SELECT assembler.
//!
//! ## Design
//!
//! - Clauses are accumulated as SQL text fragments and rendered in a fixed
//!   order, whatever order they were configured in.
//! - Bound values are written as markers (`$?`) in predicates and numbered
//!   when the query is built ($1, $2, ... or `?`).
//! - A [`Record`](crate::Record) can stand in for a column list.

pub mod select;
pub mod selection;
pub mod traits;

pub use select::{BoundValue, QueryBuilder};
pub use selection::Selection;
pub use traits::{MutationBuilder, SqlBuilder};

#[cfg(test)]
mod tests;
