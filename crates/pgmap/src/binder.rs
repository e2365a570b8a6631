//! Record-driven INSERT / UPDATE / DELETE.
//!
//! Each call renders one self-contained statement from a [`Record`]'s field
//! table, numbering its placeholders from 1, and runs it on any
//! [`GenericClient`] (a connection or a transaction).
//!
//! ```ignore
//! let id: Option<i64> = pgmap::insert(&client, "users", &user).await?;
//! user.id = id.unwrap_or_default();
//! user.username = "renamed".into();
//! pgmap::update(&client, "users", &user).await?;
//! pgmap::delete(&client, "users", &user).await?;
//! ```
//!
//! Primary-key fields are left out of INSERT and read back with
//! `RETURNING`; they form the WHERE clause of UPDATE and DELETE. Computed
//! fields are never written.

use crate::builder::{MutationBuilder, SqlBuilder};
use crate::client::GenericClient;
use crate::config::PlaceholderStyle;
use crate::error::{OrmError, OrmResult};
use crate::record::{FieldDescriptor, Param, Record};
use tokio_postgres::types::{FromSql, ToSql};

/// A rendered statement plus the record values bound to it.
#[derive(Debug)]
pub struct BoundStatement<'a> {
    sql: String,
    params: Vec<Param<'a>>,
    /// Column read back by `RETURNING`
    returning: Option<&'static str>,
}

impl<'a> BoundStatement<'a> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param<'a>] {
        &self.params
    }

    /// The column named in the `RETURNING` clause, if any.
    pub fn returning(&self) -> Option<&'static str> {
        self.returning
    }
}

impl SqlBuilder for BoundStatement<'_> {
    fn build_sql(&self) -> String {
        self.sql.clone()
    }

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_sql).collect()
    }
}

impl MutationBuilder for BoundStatement<'_> {}

/// Renders and runs record statements with a given placeholder style.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binder {
    placeholder: PlaceholderStyle,
}

impl Binder {
    pub fn new(placeholder: PlaceholderStyle) -> Self {
        Self { placeholder }
    }

    pub fn placeholder(&self) -> PlaceholderStyle {
        self.placeholder
    }

    /// `INSERT INTO table ("c1","c2") VALUES($1,$2) [RETURNING "pk"]`.
    ///
    /// Columns are the mapped fields that are neither computed nor part of
    /// the primary key. The first primary-key column, if any, is returned.
    pub fn insert_statement<'r, R: Record>(
        &self,
        table: &str,
        record: &'r R,
    ) -> OrmResult<BoundStatement<'r>> {
        let fields = R::fields();
        let mut columns = Vec::with_capacity(fields.len());
        let mut placeholders = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());
        let mut returning = None;

        for (field, param) in fields.iter().zip(record.params()?) {
            if !field.is_writable() {
                continue;
            }
            if field.primary_key {
                returning.get_or_insert(field.column);
                continue;
            }
            params.push(param);
            columns.push(field.column);
            placeholders.push(self.placeholder.render(params.len()));
        }

        if columns.is_empty() {
            return Err(OrmError::NoMappedFields {
                type_name: R::TYPE_NAME,
                context: "insert",
            });
        }

        let mut sql = format!(
            r#"INSERT INTO {} ("{}") VALUES({})"#,
            table,
            columns.join(r#"",""#),
            placeholders.join(",")
        );
        if let Some(pk) = returning {
            sql.push_str(&format!(r#" RETURNING "{}""#, pk));
        }

        Ok(BoundStatement {
            sql,
            params,
            returning,
        })
    }

    /// `UPDATE table SET "c1" = $1,... WHERE ("pk" = $n AND ...)`.
    ///
    /// Placeholders are numbered in text order: the SET list first, then the
    /// key predicate. Bound values follow the same order, so positional
    /// `?` placeholders line up too.
    pub fn update_statement<'r, R: Record>(
        &self,
        table: &str,
        record: &'r R,
    ) -> OrmResult<BoundStatement<'r>> {
        let fields = R::fields();
        if !fields.iter().any(is_key) {
            return Err(OrmError::NoPrimaryKey {
                type_name: R::TYPE_NAME,
            });
        }

        let mut set_columns = Vec::with_capacity(fields.len());
        let mut set_params = Vec::with_capacity(fields.len());
        let mut key_columns = Vec::new();
        let mut key_params = Vec::new();

        for (field, param) in fields.iter().zip(record.params()?) {
            if !field.is_writable() {
                continue;
            }
            if field.primary_key {
                key_columns.push(field.column);
                key_params.push(param);
            } else {
                set_columns.push(field.column);
                set_params.push(param);
            }
        }

        if set_columns.is_empty() {
            return Err(OrmError::NoMappedFields {
                type_name: R::TYPE_NAME,
                context: "update",
            });
        }

        let assignments = self.predicates(&set_columns, 1);
        let keys = self.predicates(&key_columns, set_columns.len() + 1);
        let sql = format!(
            "UPDATE {} SET {} WHERE ({})",
            table,
            assignments.join(","),
            keys.join(" AND ")
        );

        set_params.append(&mut key_params);
        Ok(BoundStatement {
            sql,
            params: set_params,
            returning: None,
        })
    }

    /// `DELETE FROM table WHERE "pk" = $1 [AND "pk2" = $2 ...]`.
    ///
    /// Every stored primary-key field takes part, so composite keys delete
    /// exactly one row. Computed fields are never part of the key.
    pub fn delete_statement<'r, R: Record>(
        &self,
        table: &str,
        record: &'r R,
    ) -> OrmResult<BoundStatement<'r>> {
        let fields = R::fields();
        if !fields.iter().any(is_key) {
            return Err(OrmError::NoPrimaryKey {
                type_name: R::TYPE_NAME,
            });
        }

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for (field, param) in fields.iter().zip(record.params()?) {
            if is_key(field) {
                columns.push(field.column);
                params.push(param);
            }
        }

        let keys = self.predicates(&columns, 1);
        let sql = format!("DELETE FROM {} WHERE {}", table, keys.join(" AND "));

        Ok(BoundStatement {
            sql,
            params,
            returning: None,
        })
    }

    /// `"column" = <placeholder>` for each column, numbered from `first`.
    fn predicates(&self, columns: &[&str], first: usize) -> Vec<String> {
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                format!(r#""{}" = {}"#, column, self.placeholder.render(first + i))
            })
            .collect()
    }

    /// Insert `record` into `table`.
    ///
    /// Returns the generated primary key when the record declares one,
    /// otherwise `None` after a plain execute.
    pub async fn insert<K, C, R>(&self, conn: &C, table: &str, record: &R) -> OrmResult<Option<K>>
    where
        K: for<'a> FromSql<'a>,
        C: GenericClient,
        R: Record + Sync,
    {
        let stmt = self.insert_statement(table, record)?;
        match stmt.returning() {
            Some(column) => {
                let row = stmt.query_one(conn).await?;
                let key = row
                    .try_get(0)
                    .map_err(|e| OrmError::decode(column, e.to_string()))?;
                Ok(Some(key))
            }
            None => {
                stmt.execute(conn).await?;
                Ok(None)
            }
        }
    }

    /// Update the row identified by the record's primary key.
    ///
    /// Fails with [`OrmError::NoPrimaryKey`] before touching the database
    /// when the record has no primary-key field. Returns affected rows.
    pub async fn update<C, R>(&self, conn: &C, table: &str, record: &R) -> OrmResult<u64>
    where
        C: GenericClient,
        R: Record + Sync,
    {
        let stmt = self.update_statement(table, record)?;
        stmt.execute(conn).await
    }

    /// Delete the row identified by the record's primary key.
    pub async fn delete<C, R>(&self, conn: &C, table: &str, record: &R) -> OrmResult<u64>
    where
        C: GenericClient,
        R: Record + Sync,
    {
        let stmt = self.delete_statement(table, record)?;
        stmt.execute(conn).await
    }
}

/// Primary-key fields that are stored columns rather than computed expressions.
fn is_key(field: &FieldDescriptor) -> bool {
    field.primary_key && field.is_writable()
}

/// [`Binder::insert`] with `$n` placeholders.
pub async fn insert<K, C, R>(conn: &C, table: &str, record: &R) -> OrmResult<Option<K>>
where
    K: for<'a> FromSql<'a>,
    C: GenericClient,
    R: Record + Sync,
{
    Binder::default().insert(conn, table, record).await
}

/// [`Binder::update`] with `$n` placeholders.
pub async fn update<C, R>(conn: &C, table: &str, record: &R) -> OrmResult<u64>
where
    C: GenericClient,
    R: Record + Sync,
{
    Binder::default().update(conn, table, record).await
}

/// [`Binder::delete`] with `$n` placeholders.
pub async fn delete<C, R>(conn: &C, table: &str, record: &R) -> OrmResult<u64>
where
    C: GenericClient,
    R: Record + Sync,
{
    Binder::default().delete(conn, table, record).await
}
