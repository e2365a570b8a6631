use super::*;
use crate::config::{AssemblerConfig, PlaceholderStyle};
use crate::error::{OrmError, OrmResult};
use crate::record::{FieldDescriptor, FieldTarget, Param, Record};

#[derive(Debug, Default)]
struct User {
    id: i64,
    username: String,
    password: String,
    #[allow(dead_code)]
    email: String,
    total: i64,
}

static USER_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::new("id", "id").primary_key(),
    FieldDescriptor::new("username", "username"),
    FieldDescriptor::new("password", "password"),
    FieldDescriptor::new("total", "total").computed("COUNT(col)"),
];

impl Record for User {
    const TYPE_NAME: &'static str = "User";

    fn table_name() -> &'static str {
        "user"
    }

    fn fields() -> &'static [FieldDescriptor] {
        &USER_FIELDS
    }

    fn params(&self) -> OrmResult<Vec<Param<'_>>> {
        Ok(vec![
            Param::borrowed(&self.id),
            Param::borrowed(&self.username),
            Param::borrowed(&self.password),
            Param::borrowed(&self.total),
        ])
    }

    fn targets(&mut self) -> Vec<FieldTarget<'_>> {
        vec![
            FieldTarget::Column(&mut self.id),
            FieldTarget::Column(&mut self.username),
            FieldTarget::Column(&mut self.password),
            FieldTarget::Column(&mut self.total),
        ]
    }
}

struct Profile;

static PROFILE_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("user_id", "user_id").prefix("p"),
    FieldDescriptor::new("bio", "bio"),
];

impl Record for Profile {
    const TYPE_NAME: &'static str = "Profile";

    fn table_name() -> &'static str {
        "profile"
    }

    fn fields() -> &'static [FieldDescriptor] {
        &PROFILE_FIELDS
    }

    fn params(&self) -> OrmResult<Vec<Param<'_>>> {
        Ok(Vec::new())
    }

    fn targets(&mut self) -> Vec<FieldTarget<'_>> {
        Vec::new()
    }
}

struct Unmapped;

impl Record for Unmapped {
    const TYPE_NAME: &'static str = "Unmapped";

    fn table_name() -> &'static str {
        "unmapped"
    }

    fn fields() -> &'static [FieldDescriptor] {
        &[]
    }

    fn params(&self) -> OrmResult<Vec<Param<'_>>> {
        Ok(Vec::new())
    }

    fn targets(&mut self) -> Vec<FieldTarget<'_>> {
        Vec::new()
    }
}

fn ignoring_computed() -> QueryBuilder {
    QueryBuilder::with_config(AssemblerConfig::new().ignore_computed(true))
}

#[test]
fn test_select_text() {
    let mut qb = ignoring_computed();
    qb.select("id").from("mytable");
    assert_eq!(qb.build().unwrap(), "SELECT id FROM mytable");
}

#[test]
fn test_select_star_when_no_columns() {
    let mut qb = QueryBuilder::new();
    qb.from("users");
    assert_eq!(qb.build().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_select_record_ignoring_computed() {
    let mut qb = ignoring_computed();
    qb.select(&User::default()).from("users");
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "id","username","password","total" FROM users"#
    );
}

#[test]
fn test_select_record_guesses_table() {
    let mut qb = ignoring_computed();
    qb.select(Selection::of::<User>());
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "id","username","password","total" FROM user"#
    );
}

#[test]
fn test_select_record_with_computed() {
    let mut qb = QueryBuilder::new();
    qb.select(&User::default()).from("users");
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "id","username","password",(COUNT(col)) "total" FROM users"#
    );
}

#[test]
fn test_explicit_from_wins_in_any_order() {
    let mut qb = ignoring_computed();
    qb.from("accounts").select(&User::default());
    assert!(qb.build().unwrap().ends_with("FROM accounts"));

    let mut qb = ignoring_computed();
    qb.select(&User::default()).from("accounts");
    assert!(qb.build().unwrap().ends_with("FROM accounts"));
}

#[test]
fn test_select_alias_qualifies_columns() {
    let mut qb = QueryBuilder::with_config(
        AssemblerConfig::new()
            .select_alias("u")
            .ignore_computed(true),
    );
    qb.select(&User::default());
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "u"."id","u"."username","u"."password","u"."total" FROM user u"#
    );
}

#[test]
fn test_computed_is_not_qualified_by_alias() {
    let mut qb = QueryBuilder::with_config(AssemblerConfig::new().select_alias("u"));
    qb.select(&User::default());
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "u"."id","u"."username","u"."password",(COUNT(col)) "total" FROM user u"#
    );
}

#[test]
fn test_field_prefix_beats_alias() {
    let mut qb = QueryBuilder::with_config(AssemblerConfig::new().select_alias("x"));
    qb.select(&Profile);
    assert_eq!(
        qb.build().unwrap(),
        r#"SELECT "p"."user_id","x"."bio" FROM profile x"#
    );
}

#[test]
fn test_record_without_fields_fails_build() {
    let mut qb = QueryBuilder::new();
    qb.select(&Unmapped).from("t");
    let err = qb.build().unwrap_err();
    assert!(matches!(
        err,
        OrmError::NoMappedFields {
            type_name: "Unmapped",
            context: "select"
        }
    ));
    assert!(qb.build_count().is_err());
}

#[test]
fn test_marker_left_alone_without_values() {
    let mut qb = QueryBuilder::new();
    qb.select("user").from("users").and_raw("id = $?");
    assert_eq!(qb.build().unwrap(), "SELECT user FROM users WHERE id = $?");
}

#[test]
fn test_marker_numbered_with_value() {
    let mut qb = QueryBuilder::new();
    qb.select("name")
        .from("users")
        .and_where_bind("id_user = $?", 1_i64);
    assert_eq!(
        qb.build().unwrap(),
        "SELECT name FROM users WHERE id_user = $1"
    );
    assert_eq!(qb.values().len(), 1);
    assert_eq!(qb.params_ref().len(), 1);
}

#[test]
fn test_markers_numbered_across_predicates() {
    let mut qb = QueryBuilder::new();
    qb.select("id")
        .from("users")
        .and_where("age > $? AND age < $?", crate::params![18_i32, 65_i32])
        .and_where_bind("name = $?", "alice");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT id FROM users WHERE age > $1 AND age < $2 AND name = $3"
    );
    assert_eq!(qb.values().len(), 3);
}

#[test]
fn test_extra_markers_stay_literal() {
    let mut qb = QueryBuilder::new();
    qb.from("t").and_where_bind("a = $? AND b = $?", 1_i32);
    assert_eq!(qb.build().unwrap(), "SELECT * FROM t WHERE a = $1 AND b = $?");
}

#[test]
fn test_question_placeholder_style() {
    let mut qb = QueryBuilder::with_config(
        AssemblerConfig::new().placeholder(PlaceholderStyle::Question),
    );
    qb.from("users")
        .and_where("a = $? OR b = $?", crate::params![1_i32, 2_i32]);
    assert_eq!(
        qb.build().unwrap(),
        "SELECT * FROM users WHERE a = ? OR b = ?"
    );
}

#[test]
fn test_custom_marker() {
    let mut qb = QueryBuilder::with_config(AssemblerConfig::new().marker(":v"));
    qb.from("users").and_where_bind("id = :v", 3_i64);
    assert_eq!(qb.build().unwrap(), "SELECT * FROM users WHERE id = $1");
}

#[test]
fn test_multiple_where() {
    let mut qb = QueryBuilder::new();
    qb.select("user")
        .from("users")
        .and_raw("user = 'user'")
        .and_raw("password = 'secret'");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT user FROM users WHERE user = 'user' AND password = 'secret'"
    );
}

#[test]
fn test_inner_joins() {
    let mut qb = QueryBuilder::new();
    qb.select("user").from("users").inner_join("config USING(id)");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT user FROM users INNER JOIN config USING(id)"
    );

    qb.inner_join("other USING(other_id)");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT user FROM users INNER JOIN config USING(id) INNER JOIN other USING(other_id)"
    );
}

#[test]
fn test_clause_order_is_fixed() {
    let mut qb = QueryBuilder::new();
    qb.limit("10")
        .order_by("id DESC")
        .having("COUNT(*) > 1")
        .group_by("u.id")
        .and_raw("u.active")
        .left_join("roles r ON r.id = u.role_id")
        .inner_join("teams t USING(team_id)")
        .from("users u")
        .select("u.id");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT u.id FROM users u INNER JOIN teams t USING(team_id) \
         LEFT JOIN roles r ON r.id = u.role_id WHERE u.active \
         GROUP BY u.id HAVING COUNT(*) > 1 ORDER BY id DESC LIMIT 10"
    );
}

#[test]
fn test_no_from_when_table_empty() {
    let mut qb = QueryBuilder::new();
    qb.select("1");
    assert_eq!(qb.build().unwrap(), "SELECT 1");
}

#[test]
fn test_build_count_skips_order_and_limit() {
    let mut qb = QueryBuilder::new();
    qb.select("id, name")
        .from("users")
        .and_where_bind("status = $?", "active")
        .order_by("name")
        .limit("5");
    assert_eq!(
        qb.build_count().unwrap(),
        "SELECT COUNT(*) FROM users WHERE status = $1"
    );
    assert_eq!(qb.sql(), "SELECT COUNT(*) FROM users WHERE status = $1");
    assert_eq!(qb.to_count_sql(), qb.sql());
}

#[test]
fn test_rebuild_is_stable_and_reflects_changes() {
    let mut qb = QueryBuilder::new();
    qb.select("id").from("users").and_where_bind("id = $?", 1_i64);
    let first = qb.build().unwrap().to_string();
    assert_eq!(qb.build().unwrap(), first);

    qb.order_by("id");
    assert_eq!(qb.build().unwrap(), "SELECT id FROM users WHERE id = $1 ORDER BY id");
}

#[test]
fn test_limit_replaces_previous() {
    let mut qb = QueryBuilder::new();
    qb.from("users").limit("10").limit("20 OFFSET 40");
    assert_eq!(qb.build().unwrap(), "SELECT * FROM users LIMIT 20 OFFSET 40");
}

#[test]
fn test_group_by_and_order_by_are_comma_joined() {
    let mut qb = QueryBuilder::new();
    qb.select("a, b, COUNT(*)")
        .from("t")
        .group_by("a")
        .group_by("b")
        .order_by("a")
        .order_by("b DESC");
    assert_eq!(
        qb.build().unwrap(),
        "SELECT a, b, COUNT(*) FROM t GROUP BY a, b ORDER BY a, b DESC"
    );
}

#[test]
fn test_params_macro() {
    let empty = crate::params![];
    assert!(empty.is_empty());
    let values = crate::params![1_i32, "two", 3.0_f64,];
    assert_eq!(values.len(), 3);
}

#[test]
fn test_to_sql_matches_build() {
    let mut qb = QueryBuilder::new();
    qb.select("id").from("users").and_where_bind("id = $?", 9_i64);
    let rendered = qb.to_sql();
    assert_eq!(qb.build().unwrap(), rendered);
}
