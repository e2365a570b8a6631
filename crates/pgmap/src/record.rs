//! Record metadata and field binding.
//!
//! A [`Record`] is a struct whose fields map onto table columns. The mapping is
//! described once per type by a static table of [`FieldDescriptor`]s, normally
//! generated by `#[derive(Record)]`:
//!
//! ```ignore
//! use pgmap::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[db(column = "id", pk)]
//!     id: i64,
//!     #[db(column = "username")]
//!     username: String,
//!     #[db(column = "total", computed = "COUNT(col)")]
//!     total: i64,
//!     // no `column`: not mapped
//!     email: String,
//! }
//! ```
//!
//! The descriptor table drives SELECT column lists, INSERT/UPDATE/DELETE
//! statements, and scanning a row back into the struct.

use crate::error::{OrmError, OrmResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Json, ToSql};

/// How a field value is converted before being bound as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Bind the field as-is.
    #[default]
    Raw,
    /// Bind the time of day as `HH:MM:SS` text.
    Time,
    /// Bind the field serialized as JSON.
    Json,
}

/// Static description of one mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub field: &'static str,
    /// Column name in the database.
    pub column: &'static str,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Read-only SQL expression this column is computed from.
    pub computed: Option<&'static str>,
    /// Qualifier used in SELECT lists instead of the builder alias.
    pub prefix: Option<&'static str>,
    pub kind: ValueKind,
}

impl FieldDescriptor {
    /// A plain column with default settings.
    pub const fn new(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column,
            primary_key: false,
            computed: None,
            prefix: None,
            kind: ValueKind::Raw,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn computed(mut self, expr: &'static str) -> Self {
        self.computed = Some(expr);
        self
    }

    pub const fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub const fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the field is written by INSERT/UPDATE.
    pub fn is_writable(&self) -> bool {
        self.computed.is_none()
    }
}

/// A value ready to be bound as a query parameter.
///
/// Raw fields are borrowed straight from the record; coerced fields own the
/// converted value.
pub enum Param<'a> {
    Borrowed(&'a (dyn ToSql + Sync)),
    Owned(Box<dyn ToSql + Sync + Send>),
}

impl<'a> Param<'a> {
    /// Borrow a field value.
    pub fn borrowed(value: &'a (dyn ToSql + Sync)) -> Self {
        Self::Borrowed(value)
    }

    /// Own a converted value.
    pub fn owned<T>(value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        Self::Owned(Box::new(value))
    }

    /// Parameter ref compatible with `tokio-postgres`.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Self::Borrowed(v) => *v,
            Self::Owned(v) => v.as_ref() as &(dyn ToSql + Sync),
        }
    }
}

impl std::fmt::Debug for Param<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&self.as_sql()).finish()
    }
}

/// A struct mapped onto table columns.
///
/// `fields()`, `params()` and `targets()` are aligned: entry `i` of each
/// refers to the same struct field.
pub trait Record {
    /// Rust type name, used in error messages.
    const TYPE_NAME: &'static str;

    /// Table the record is read from when selected without an explicit `from`.
    fn table_name() -> &'static str;

    /// Mapped fields in declaration order.
    fn fields() -> &'static [FieldDescriptor];

    /// One bind value per mapped field, with the field's [`ValueKind`] applied.
    fn params(&self) -> OrmResult<Vec<Param<'_>>>;

    /// One writable target per mapped field.
    fn targets(&mut self) -> Vec<FieldTarget<'_>>;
}

/// A field that can receive a decoded column value.
pub trait ColumnTarget {
    fn scan_column(&mut self, row: &Row, idx: usize) -> OrmResult<()>;
}

impl<T> ColumnTarget for T
where
    T: for<'a> FromSql<'a>,
{
    fn scan_column(&mut self, row: &Row, idx: usize) -> OrmResult<()> {
        *self = row
            .try_get(idx)
            .map_err(|e| OrmError::decode(column_label(row, idx), e.to_string()))?;
        Ok(())
    }
}

/// A field stored as JSON and decoded through `serde`.
pub trait JsonTarget {
    fn scan_json(&mut self, row: &Row, idx: usize) -> OrmResult<()>;
}

impl<T> JsonTarget for T
where
    T: DeserializeOwned,
{
    fn scan_json(&mut self, row: &Row, idx: usize) -> OrmResult<()> {
        let raw: Option<Json<serde_json::Value>> = row
            .try_get(idx)
            .map_err(|e| OrmError::decode(column_label(row, idx), e.to_string()))?;
        let value = raw.map(|Json(v)| v).unwrap_or(serde_json::Value::Null);
        *self = serde_json::from_value(value)
            .map_err(|e| OrmError::decode(column_label(row, idx), e.to_string()))?;
        Ok(())
    }
}

/// Writable reference to one mapped field.
pub enum FieldTarget<'a> {
    Column(&'a mut dyn ColumnTarget),
    Json(&'a mut dyn JsonTarget),
}

impl FieldTarget<'_> {
    /// Decode column `idx` of `row` into the field.
    pub fn scan(&mut self, row: &Row, idx: usize) -> OrmResult<()> {
        match self {
            Self::Column(t) => t.scan_column(row, idx),
            Self::Json(t) => t.scan_json(row, idx),
        }
    }
}

fn column_label(row: &Row, idx: usize) -> String {
    row.columns()
        .get(idx)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| format!("#{idx}"))
}

/// Writable references to every mapped field of `record`, in declared order.
///
/// Pair with a query selecting the same columns in the same order, or use
/// [`scan_row`] directly.
pub fn field_targets<R: Record>(record: &mut R) -> Vec<FieldTarget<'_>> {
    record.targets()
}

/// Scan `row` positionally into the mapped fields of `record`.
///
/// Column `i` is written to mapped field `i`. The row must have at least as
/// many columns as the record has mapped fields.
pub fn scan_row<R: Record>(record: &mut R, row: &Row) -> OrmResult<()> {
    let columns = row.len();
    let mut targets = record.targets();
    if columns < targets.len() {
        return Err(OrmError::decode(
            R::TYPE_NAME,
            format!(
                "row has {columns} columns but {} fields are mapped",
                targets.len()
            ),
        ));
    }
    for (idx, target) in targets.iter_mut().enumerate() {
        target.scan(row, idx)?;
    }
    Ok(())
}

// ==================== Value coercion ====================

/// Types that have a time of day, for [`ValueKind::Time`] fields.
pub trait TimeOfDay {
    /// Formatted as `HH:MM:SS`; `None` binds SQL NULL.
    fn time_of_day(&self) -> Option<String>;
}

const TIME_OF_DAY: &str = "%H:%M:%S";

impl TimeOfDay for chrono::NaiveTime {
    fn time_of_day(&self) -> Option<String> {
        Some(self.format(TIME_OF_DAY).to_string())
    }
}

impl TimeOfDay for chrono::NaiveDateTime {
    fn time_of_day(&self) -> Option<String> {
        Some(self.format(TIME_OF_DAY).to_string())
    }
}

impl<Tz> TimeOfDay for chrono::DateTime<Tz>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fn time_of_day(&self) -> Option<String> {
        Some(self.format(TIME_OF_DAY).to_string())
    }
}

impl<T: TimeOfDay> TimeOfDay for Option<T> {
    fn time_of_day(&self) -> Option<String> {
        self.as_ref().and_then(TimeOfDay::time_of_day)
    }
}

/// Bind value for a [`ValueKind::Time`] field.
pub fn time_param<T: TimeOfDay + ?Sized>(value: &T) -> Param<'static> {
    Param::owned(value.time_of_day())
}

/// Bind value for a [`ValueKind::Json`] field.
///
/// A value serializing to JSON `null` (e.g. `None`) binds SQL NULL.
pub fn json_param<T: Serialize + ?Sized>(value: &T) -> OrmResult<Param<'static>> {
    let json = serde_json::to_value(value)?;
    if json.is_null() {
        return Ok(Param::owned(None::<Json<serde_json::Value>>));
    }
    Ok(Param::owned(Some(Json(json))))
}
