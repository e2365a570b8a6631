//! Derive macros for pgmap
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive the `Record` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use pgmap::Record;
///
/// #[derive(Debug, Default, Record)]
/// #[db(table = "users")]
/// struct User {
///     #[db(column = "id", pk)]
///     id: i64,
///     #[db(column = "username")]
///     username: String,
///     #[db(column = "total", computed = "COUNT(col)")]
///     total: i64,
///     #[db(column = "opens_at", kind = "time")]
///     opens_at: chrono::NaiveTime,
///     #[db(column = "settings", kind = "json")]
///     settings: serde_json::Value,
///     // not mapped
///     scratch: String,
/// }
/// ```
///
/// # Attributes
///
/// Struct level:
/// - `#[db(table = "name")]` - Table used when the record is selected without
///   an explicit `from` (defaults to the lower-cased struct name)
///
/// Field level (a field is mapped only when it has a `column`):
/// - `column = "name"` - Column name
/// - `pk` - Part of the primary key
/// - `computed = "EXPR"` - Read-only SQL expression, never written
/// - `prefix = "alias"` - Qualifier used in SELECT lists
/// - `kind = "time"` - Bind the time of day as `HH:MM:SS`
/// - `kind = "json"` - Bind and scan through `serde_json`
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
