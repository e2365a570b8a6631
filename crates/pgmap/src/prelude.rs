//! Convenient imports for typical `pgmap` usage.
//!
//! ```ignore
//! use pgmap::prelude::*;
//! ```

pub use crate::{
    AssemblerConfig, Binder, GenericClient, MutationBuilder, OrmError, OrmResult,
    PlaceholderStyle, QueryBuilder, Record, Selection, SqlBuilder, params,
};
