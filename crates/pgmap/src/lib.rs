//! # pgmap
//!
//! A small SQL query assembler plus struct-to-table mapping for PostgreSQL.
//!
//! ## Features
//!
//! - **Text assembler**: `QueryBuilder` collects SQL fragments and renders them
//!   in a fixed clause order, numbering `$?` markers as positional parameters
//! - **Struct mapping**: `#[derive(Record)]` describes which fields map to
//!   which columns, once per type
//! - **Record CRUD**: `insert` / `update` / `delete` render a statement from a
//!   record and run it
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient`
//!   is expected
//!
//! ## Query builder
//!
//! ```ignore
//! use pgmap::{QueryBuilder, SqlBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.select("name")
//!     .from("users")
//!     .and_where_bind("id_user = $?", 42_i64);
//! // SELECT name FROM users WHERE id_user = $1
//! let row = qb.query_one(&client).await?;
//! ```
//!
//! ## Records
//!
//! ```ignore
//! use pgmap::{QueryBuilder, Record, SqlBuilder};
//!
//! #[derive(Debug, Default, Record)]
//! #[db(table = "users")]
//! struct User {
//!     #[db(column = "id", pk)]
//!     id: i64,
//!     #[db(column = "username")]
//!     username: String,
//! }
//!
//! let mut user = User { username: "alice".into(), ..Default::default() };
//! user.id = pgmap::insert(&client, "users", &user).await?.unwrap_or_default();
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(&user).and_where_bind("id = $?", user.id);
//! // SELECT "id","username" FROM users WHERE id = $1
//! let mut found = User::default();
//! qb.query_into(&client, &mut found).await?;
//! ```
//!
//! Statements are logged at `debug` level on the `pgmap.sql` tracing target
//! before they run.

pub mod binder;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod record;

pub use binder::{Binder, BoundStatement, delete, insert, update};
pub use builder::{BoundValue, MutationBuilder, QueryBuilder, Selection, SqlBuilder};
pub use client::GenericClient;
pub use config::{AssemblerConfig, DEFAULT_MARKER, PlaceholderStyle};
pub use error::{OrmError, OrmResult};
pub use record::{
    ColumnTarget, FieldDescriptor, FieldTarget, JsonTarget, Param, Record, TimeOfDay, ValueKind,
    field_targets, json_param, scan_row, time_param,
};

// Re-export derive macros when the "derive" feature is enabled
#[cfg(feature = "derive")]
pub use pgmap_derive::Record;

// Re-export tokio_postgres types for convenience
pub use tokio_postgres::types::Json;
