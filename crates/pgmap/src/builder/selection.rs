use crate::record::{FieldDescriptor, Record};

/// What a [`QueryBuilder::select`](super::QueryBuilder::select) call adds to
/// the select list.
///
/// Literal text is used verbatim. A record contributes one column per mapped
/// field and supplies a default table name.
///
/// Anything else is rejected by the compiler:
///
/// ```compile_fail
/// let mut qb = pgmap::QueryBuilder::new();
/// qb.select(123);
/// ```
#[derive(Debug, Clone)]
pub enum Selection {
    /// Column list text, appended as-is.
    Text(String),
    /// Columns described by a record's field table.
    Record {
        type_name: &'static str,
        table: &'static str,
        fields: &'static [FieldDescriptor],
    },
}

impl Selection {
    /// Select the mapped columns of `R`.
    pub fn of<R: Record>() -> Self {
        Self::Record {
            type_name: R::TYPE_NAME,
            table: R::table_name(),
            fields: R::fields(),
        }
    }
}

impl From<&str> for Selection {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Selection {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<R: Record> From<&R> for Selection {
    fn from(_: &R) -> Self {
        Self::of::<R>()
    }
}
