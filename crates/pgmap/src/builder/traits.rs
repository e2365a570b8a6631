use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::record::{Record, scan_row};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Emit the statement about to run on the `pgmap.sql` target.
pub(crate) fn log_statement(sql: &str, param_count: usize) {
    tracing::debug!(target: "pgmap.sql", param_count, sql = %sql, "executing statement");
}

/// Base trait for SQL builders.
pub trait SqlBuilder: Sync {
    /// Build the SQL string.
    fn build_sql(&self) -> String;

    /// Get parameters as references compatible with tokio-postgres.
    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)>;

    /// Debug helper.
    fn to_sql(&self) -> String {
        self.build_sql()
    }

    /// Validate builder state.
    fn validate(&self) -> OrmResult<()> {
        Ok(())
    }

    /// Execute query and return all rows.
    fn query(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        async move {
            self.validate()?;
            let sql = self.build_sql();
            let params = self.params_ref();
            log_statement(&sql, params.len());
            conn.query(&sql, &params).await
        }
    }

    /// Execute query and return at most one row.
    fn query_opt(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        async move {
            self.validate()?;
            let sql = self.build_sql();
            let params = self.params_ref();
            log_statement(&sql, params.len());
            conn.query_opt(&sql, &params).await
        }
    }

    /// Execute query and return the first row.
    fn query_one(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Row>> + Send {
        async move {
            self.validate()?;
            let sql = self.build_sql();
            let params = self.params_ref();
            log_statement(&sql, params.len());
            conn.query_one(&sql, &params).await
        }
    }

    /// Execute query and scan the first row into `record`.
    ///
    /// Columns are matched to the record's mapped fields by position, so the
    /// select list must follow the record's field order (as `select(&record)`
    /// does). Returns [`OrmError::NotFound`](crate::OrmError::NotFound) when no
    /// row comes back.
    fn query_into<R: Record + Send>(
        &self,
        conn: &impl GenericClient,
        record: &mut R,
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        async move {
            let row = self.query_one(conn).await?;
            scan_row(record, &row)
        }
    }

    /// Execute query and scan every row into a fresh `R::default()`.
    fn query_records<R: Record + Default>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<R>>> + Send {
        async move {
            let rows = self.query(conn).await?;
            rows.iter()
                .map(|row| {
                    let mut record = R::default();
                    scan_row(&mut record, row)?;
                    Ok(record)
                })
                .collect()
        }
    }
}

/// Trait for mutation statements (INSERT/UPDATE/DELETE).
pub trait MutationBuilder: SqlBuilder {
    /// Execute and return affected row count.
    fn execute(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        async move {
            self.validate()?;
            let sql = self.build_sql();
            let params = self.params_ref();
            log_statement(&sql, params.len());
            conn.execute(&sql, &params).await
        }
    }
}
