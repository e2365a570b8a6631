use super::selection::Selection;
use super::traits::{SqlBuilder, log_statement};
use crate::client::GenericClient;
use crate::config::AssemblerConfig;
use crate::error::{OrmError, OrmResult};
use crate::record::FieldDescriptor;
use tokio_postgres::types::ToSql;

/// A value bound to a filter predicate.
pub type BoundValue = Box<dyn ToSql + Sync + Send>;

/// Build a `Vec<BoundValue>` for [`QueryBuilder::and_where`].
///
/// ```ignore
/// qb.and_where("age > $? AND name = $?", params![18_i32, "alice"]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::BoundValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$(::std::boxed::Box::new($value) as $crate::BoundValue),+]
    };
}

/// Fluent SELECT assembler.
///
/// Clauses can be configured in any order; they always render as SELECT,
/// FROM, INNER JOIN, LEFT JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT.
/// Fragments are plain SQL text and are neither escaped nor validated.
///
/// Bound values go through placeholder markers (`$?` by default) written in
/// predicate text. On build, markers are replaced left to right with
/// positional parameters, one per bound value.
///
/// ```ignore
/// let mut qb = QueryBuilder::new();
/// qb.select("name").from("users").and_where_bind("id_user = $?", id);
/// let row = qb.query_one(&client).await?;
/// ```
pub struct QueryBuilder {
    config: AssemblerConfig,
    /// SELECT expressions
    columns: Vec<String>,
    /// FROM table
    table: Option<String>,
    /// Whether `table` was set by `from()` rather than inferred from a record
    table_explicit: bool,
    inner_joins: Vec<String>,
    left_joins: Vec<String>,
    /// WHERE predicates (AND-joined)
    where_conditions: Vec<String>,
    /// Values for the WHERE markers, in call order
    values: Vec<BoundValue>,
    group_by: Vec<String>,
    /// HAVING predicates (AND-joined)
    having_conditions: Vec<String>,
    order_clauses: Vec<String>,
    limit: Option<String>,
    /// Last rendered SQL
    sql: String,
    /// Record selected without mapped fields (validated at build time)
    build_error: Option<&'static str>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::with_config(AssemblerConfig::default())
    }
}

impl QueryBuilder {
    /// Create an empty query builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty query builder.
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            table: None,
            table_explicit: false,
            inner_joins: Vec::new(),
            left_joins: Vec::new(),
            where_conditions: Vec::new(),
            values: Vec::new(),
            group_by: Vec::new(),
            having_conditions: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            sql: String::new(),
            build_error: None,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut AssemblerConfig {
        &mut self.config
    }

    // ==================== SELECT ====================

    /// Append to the select list.
    ///
    /// Text is appended verbatim. A record (`&user` or
    /// `Selection::of::<User>()`) appends one expression per mapped field:
    ///
    /// - computed fields render as `(expr) "column"`, unless
    ///   [`AssemblerConfig::ignore_computed`] is set;
    /// - other fields render as `"column"`, qualified as `"prefix"."column"`
    ///   by the field's prefix or else the configured select alias.
    ///
    /// A record also sets the FROM table to its table name unless `from()` is
    /// used. A record without mapped fields makes the next build fail.
    pub fn select(&mut self, source: impl Into<Selection>) -> &mut Self {
        match source.into() {
            Selection::Text(text) => self.columns.push(text),
            Selection::Record {
                type_name,
                table,
                fields,
            } => self.select_fields(type_name, table, fields),
        }
        self
    }

    fn select_fields(
        &mut self,
        type_name: &'static str,
        table: &'static str,
        fields: &'static [FieldDescriptor],
    ) {
        if fields.is_empty() {
            self.build_error = Some(type_name);
            return;
        }

        if !self.table_explicit {
            self.table = Some(table.to_string());
        }

        for field in fields {
            let column = match field.computed {
                Some(expr) if !self.config.ignore_computed => {
                    format!(r#"({}) "{}""#, expr, field.column)
                }
                _ => {
                    let alias = self.config.select_alias.as_deref().filter(|a| !a.is_empty());
                    let prefix: Option<&str> = field.prefix.filter(|p| !p.is_empty()).or(alias);
                    match prefix {
                        Some(prefix) => format!(r#""{}"."{}""#, prefix, field.column),
                        None => format!(r#""{}""#, field.column),
                    }
                }
            };
            self.columns.push(column);
        }
    }

    /// Set the FROM table, overriding any table inferred from a record.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self.table_explicit = true;
        self
    }

    // ==================== JOIN ====================

    /// Add an INNER JOIN fragment, e.g. `"config USING(id)"`.
    pub fn inner_join(&mut self, fragment: &str) -> &mut Self {
        self.inner_joins.push(fragment.to_string());
        self
    }

    /// Add a LEFT JOIN fragment.
    pub fn left_join(&mut self, fragment: &str) -> &mut Self {
        self.left_joins.push(fragment.to_string());
        self
    }

    // ==================== Conditions ====================

    /// Add a WHERE predicate with values for its `$?` markers.
    ///
    /// Predicates are AND-joined. Values are appended to the bound values in
    /// call order.
    pub fn and_where(&mut self, predicate: &str, values: Vec<BoundValue>) -> &mut Self {
        self.where_conditions.push(predicate.to_string());
        self.values.extend(values);
        self
    }

    /// Add a WHERE predicate with a single bound value.
    pub fn and_where_bind<T>(&mut self, predicate: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.where_conditions.push(predicate.to_string());
        self.values.push(Box::new(value));
        self
    }

    /// Add a raw WHERE predicate without values.
    pub fn and_raw(&mut self, predicate: &str) -> &mut Self {
        self.where_conditions.push(predicate.to_string());
        self
    }

    /// Add a HAVING predicate (AND-joined).
    pub fn having(&mut self, predicate: &str) -> &mut Self {
        self.having_conditions.push(predicate.to_string());
        self
    }

    // ==================== Grouping, ordering & limit ====================

    pub fn group_by(&mut self, clause: &str) -> &mut Self {
        self.group_by.push(clause.to_string());
        self
    }

    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    /// Set the LIMIT expression, replacing any previous one.
    pub fn limit(&mut self, limit: &str) -> &mut Self {
        self.limit = Some(limit.to_string());
        self
    }

    /// Values bound to WHERE markers, flattened in call order.
    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    // ==================== SQL build ====================

    fn select_clause(&self) -> String {
        if self.columns.is_empty() {
            "SELECT *".to_string()
        } else {
            format!("SELECT {}", self.columns.join(","))
        }
    }

    fn from_clause(&self) -> String {
        let Some(table) = self.table.as_deref().filter(|t| !t.is_empty()) else {
            return String::new();
        };
        match self.config.select_alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => format!("FROM {} {}", table, alias),
            None => format!("FROM {}", table),
        }
    }

    fn list_clause(keyword: &str, items: &[String], sep: &str) -> String {
        if items.is_empty() {
            String::new()
        } else {
            format!("{} {}", keyword, items.join(sep))
        }
    }

    fn build_sql_internal(&self, is_count: bool) -> String {
        let select = if is_count {
            "SELECT COUNT(*)".to_string()
        } else {
            self.select_clause()
        };

        let mut parts = vec![
            select,
            self.from_clause(),
            Self::list_clause("INNER JOIN", &self.inner_joins, " INNER JOIN "),
            Self::list_clause("LEFT JOIN", &self.left_joins, " LEFT JOIN "),
            Self::list_clause("WHERE", &self.where_conditions, " AND "),
            Self::list_clause("GROUP BY", &self.group_by, ", "),
            Self::list_clause("HAVING", &self.having_conditions, " AND "),
        ];

        // Row order and row caps do not change a count.
        if !is_count {
            parts.push(Self::list_clause("ORDER BY", &self.order_clauses, ", "));
            if let Some(limit) = self.limit.as_deref().filter(|l| !l.is_empty()) {
                parts.push(format!("LIMIT {}", limit));
            }
        }

        parts.retain(|p| !p.trim().is_empty());
        self.replace_markers(&parts.join(" "))
    }

    /// Replace markers left to right, one per bound value.
    fn replace_markers(&self, sql: &str) -> String {
        let marker = self.config.marker.as_str();
        if self.values.is_empty() || marker.is_empty() {
            return sql.to_string();
        }

        let mut out = String::with_capacity(sql.len() + self.values.len() * 2);
        let mut rest = sql;
        for n in 1..=self.values.len() {
            let Some(pos) = rest.find(marker) else {
                break;
            };
            out.push_str(&rest[..pos]);
            self.config.placeholder.write(&mut out, n);
            rest = &rest[pos + marker.len()..];
        }
        out.push_str(rest);
        out
    }

    /// Render the query and keep the text, available afterwards via [`sql`](Self::sql).
    ///
    /// Building again after more configuration re-renders and replaces the
    /// cached text.
    pub fn build(&mut self) -> OrmResult<&str> {
        self.validate()?;
        self.sql = self.build_sql_internal(false);
        Ok(&self.sql)
    }

    /// Like [`build`](Self::build) but selects `COUNT(*)` instead of the
    /// configured columns. ORDER BY and LIMIT are left out.
    pub fn build_count(&mut self) -> OrmResult<&str> {
        self.validate()?;
        self.sql = self.build_sql_internal(true);
        Ok(&self.sql)
    }

    /// COUNT SQL without caching it.
    pub fn to_count_sql(&self) -> String {
        self.build_sql_internal(true)
    }

    /// Text produced by the last `build()` or `build_count()`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute COUNT query.
    pub async fn count(&self, conn: &impl GenericClient) -> OrmResult<i64> {
        self.validate()?;
        let sql = self.to_count_sql();
        let params = self.params_ref();
        log_statement(&sql, params.len());
        let row = conn.query_one(&sql, &params).await?;
        row.try_get(0)
            .map_err(|e| OrmError::decode("count", e.to_string()))
    }
}

impl SqlBuilder for QueryBuilder {
    fn build_sql(&self) -> String {
        self.build_sql_internal(false)
    }

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| &**v as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> OrmResult<()> {
        match self.build_error {
            Some(type_name) => Err(OrmError::NoMappedFields {
                type_name,
                context: "select",
            }),
            None => Ok(()),
        }
    }
}
