//! Integration tests for the query builders.

use crate::column::{Column, desc};
use crate::condition::{Placeholder, and_, between, eq, in_array, like, or_};
use crate::error::QueryResult;
use crate::query::{delete, insert, select, select_all, select_distinct, update};
use crate::row::Row;
use crate::table::{FieldDef, FieldKind, Model, Table};
use crate::value::Value;

struct User {
    id: i64,
    name: String,
    age: Option<i64>,
}

impl Model for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef {
                name: "id",
                column: Some("id"),
                kind: FieldKind::Integer,
                nullable: false,
                relation: false,
            },
            FieldDef {
                name: "name",
                column: Some("name"),
                kind: FieldKind::Text,
                nullable: false,
                relation: false,
            },
            FieldDef {
                name: "age",
                column: Some("age"),
                kind: FieldKind::Integer,
                nullable: true,
                relation: false,
            },
            FieldDef {
                name: "email",
                column: Some("email"),
                kind: FieldKind::Text,
                nullable: true,
                relation: false,
            },
        ]
    }

    fn from_row(_db_alias: &str, row: &Row) -> QueryResult<Self> {
        Ok(User {
            id: row.get("id").and_then(Value::as_i64).unwrap_or_default(),
            name: row
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            age: row.get("age").and_then(Value::as_i64),
        })
    }
}

struct Pet;

impl Model for Pet {
    fn table_name() -> &'static str {
        "pets"
    }

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef {
                name: "id",
                column: Some("id"),
                kind: FieldKind::Integer,
                nullable: false,
                relation: false,
            },
            FieldDef {
                name: "species",
                column: Some("species"),
                kind: FieldKind::Text,
                nullable: false,
                relation: false,
            },
            FieldDef {
                name: "owner",
                column: Some("owner_id"),
                kind: FieldKind::Integer,
                nullable: true,
                relation: true,
            },
        ]
    }

    fn from_row(_db_alias: &str, _row: &Row) -> QueryResult<Self> {
        Ok(Pet)
    }
}

fn users() -> Table {
    Table::from_model::<User>()
}

fn pets() -> Table {
    Table::from_model::<Pet>()
}

fn col(table: &Table, name: &str) -> Column {
    table.column(name).unwrap().clone()
}

#[test]
fn select_defaults_to_star() {
    let sql = select_all().from(&users()).sql().unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\"");
}

#[test]
fn select_with_fields_where_limit() {
    let users = users();
    let query = select(["id", "name"])
        .from(&users)
        .filter(eq(&col(&users, "age"), 20))
        .limit(1);
    let (sql, params) = query.build().unwrap();
    assert_eq!(
        sql,
        "SELECT \"id\", \"name\" FROM \"users\" WHERE \"age\" = $1 LIMIT 1"
    );
    assert_eq!(sql.matches("WHERE").count(), 1);
    assert_eq!(sql.matches("LIMIT 1").count(), 1);
    assert_eq!(params, vec![Value::Int(20)]);
}

#[test]
fn select_distinct_keyword() {
    let sql = select_distinct(["name"]).from(&users()).sql().unwrap();
    assert_eq!(sql, "SELECT DISTINCT \"name\" FROM \"users\"");
}

#[test]
fn string_field_parsing() {
    let users = users();
    let sql = select(["name as my_name", "users.name", "users.name as n"])
        .from(&users)
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT \"name\" AS \"my_name\", \"users\".\"name\", \"users\".\"name\" AS \"n\" FROM \"users\""
    );
}

#[test]
fn column_and_alias_objects_in_select() {
    let users = users();
    let name = col(&users, "name");
    let sql = select([
        crate::query::SelectItem::from(&name),
        crate::query::SelectItem::from(name.alias("who")),
    ])
    .from(&users)
    .sql()
    .unwrap();
    assert_eq!(sql, "SELECT \"name\", \"name\" AS \"who\" FROM \"users\"");
}

#[test]
fn order_by_defaults_bare_columns_to_asc() {
    let users = users();
    let sql = select_all()
        .from(&users)
        .order_by(&col(&users, "name"))
        .order_by(desc(&col(&users, "age")))
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" ORDER BY \"name\" ASC, \"age\" DESC"
    );
}

#[test]
fn limit_then_offset_order() {
    let sql = select_all()
        .from(&users())
        .limit(10)
        .offset(20)
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" LIMIT 10 OFFSET 20");
}

#[test]
fn joins_render_in_insertion_order() {
    let users = users();
    let pets = pets();
    let sql = select_all()
        .from(&users)
        .left_join(&pets, eq(&col(&users, "id"), &col(&pets, "owner_id")))
        .inner_join(&pets, eq(&col(&users, "id"), &col(&pets, "id")))
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" LEFT JOIN \"pets\" ON \"id\" = \"owner_id\" \
         INNER JOIN \"pets\" ON \"id\" = \"id\""
    );
    assert_eq!(sql.matches("JOIN").count(), 2);
}

#[test]
fn join_params_precede_where_params() {
    let users = users();
    let pets = pets();
    let query = select_all()
        .from(&users)
        .left_join(&pets, eq(&col(&pets, "species"), "dog"))
        .filter(eq(&col(&users, "name"), "Dan"));
    let (sql, params) = query.build().unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" LEFT JOIN \"pets\" ON \"species\" = $1 WHERE \"name\" = $2"
    );
    assert_eq!(
        params,
        vec![Value::Text("dog".into()), Value::Text("Dan".into())]
    );
}

#[test]
fn multiple_filters_and_together() {
    let users = users();
    let (sql, params) = select_all()
        .from(&users)
        .filter(eq(&col(&users, "name"), "Dan"))
        .filter(between(&col(&users, "age"), 18, 65))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE \"name\" = $1 AND \"age\" BETWEEN $2 AND $3"
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn compound_condition_in_where() {
    let users = users();
    let (sql, params) = select_all()
        .from(&users)
        .filter(or_([
            eq(&col(&users, "id"), 1),
            and_([
                eq(&col(&users, "name"), "Dan"),
                eq(&col(&users, "age"), 30),
            ]),
        ]))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE (\"id\" = $1) OR ((\"name\" = $2) AND (\"age\" = $3))"
    );
    assert_eq!(
        params,
        vec![Value::Int(1), Value::Text("Dan".into()), Value::Int(30)]
    );
}

#[test]
fn params_align_with_placeholders() {
    let users = users();
    let (sql, params) = select_all()
        .from(&users)
        .filter(in_array(&col(&users, "id"), [1, 2, 3]))
        .filter(between(&col(&users, "age"), 20, 30))
        .filter(like(&col(&users, "name"), "D%"))
        .build()
        .unwrap();
    assert_eq!(sql.matches('$').count(), params.len());
    assert_eq!(params.len(), 6);
    for n in 1..=params.len() {
        assert!(sql.contains(&format!("${n}")));
    }
}

#[test]
fn empty_in_list_is_emitted_verbatim() {
    let users = users();
    let (sql, params) = select_all()
        .from(&users)
        .filter(in_array(&col(&users, "id"), Vec::<i64>::new()))
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"id\" IN ()");
    assert!(params.is_empty());
}

#[test]
fn build_is_idempotent() {
    let users = users();
    let query = select_all()
        .from(&users)
        .filter(eq(&col(&users, "id"), 42));
    assert_eq!(query.sql().unwrap(), query.sql().unwrap());
    assert_eq!(query.params().unwrap(), query.params().unwrap());
}

#[test]
fn question_placeholder_style() {
    let users = users();
    let (sql, params) = select_all()
        .from(&users)
        .filter(eq(&col(&users, "name"), "Dan"))
        .filter(eq(&col(&users, "age"), 3))
        .build_with(Placeholder::Question)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE \"name\" = ? AND \"age\" = ?"
    );
    assert_eq!(params.len(), 2);
}

#[test]
fn select_without_table_is_fatal() {
    let err = select_all().sql().unwrap_err();
    assert!(err.to_string().contains("no table selected"));
}

#[test]
fn unknown_select_field_is_fatal() {
    let err = select(["nope"]).from(&users()).sql().unwrap_err();
    assert!(err.is_unknown_column());
    assert_eq!(err.to_string(), "Column nope not in table users");
}

#[test]
fn unknown_condition_column_is_fatal() {
    let users = users();
    let pets = pets();
    let err = select_all()
        .from(&users)
        .filter(eq(&col(&pets, "species"), "dog"))
        .sql()
        .unwrap_err();
    assert!(err.is_unknown_column());
    assert!(err.to_string().contains("species"));
}

#[test]
fn unknown_order_by_column_is_fatal() {
    let users = users();
    let pets = pets();
    let err = select_all()
        .from(&users)
        .order_by(&col(&pets, "species"))
        .sql()
        .unwrap_err();
    assert!(err.is_unknown_column());
}

#[test]
fn insert_single_row() {
    let users = users();
    let (sql, params) = insert(&users)
        .values(crate::RowValues::new().set("name", "Andrew").set("age", 25))
        .build()
        .unwrap();
    assert_eq!(sql, "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2)");
    assert_eq!(params, vec![Value::Text("Andrew".into()), Value::Int(25)]);
}

#[test]
fn insert_unifies_columns_and_binds_null_for_missing_keys() {
    let users = users();
    let (sql, params) = insert(&users)
        .values(vec![
            crate::RowValues::new().set("name", "Ann").set("age", 2),
            crate::RowValues::new().set("name", "Bob"),
        ])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2), ($3, $4)"
    );
    assert_eq!(
        params,
        vec![
            Value::Text("Ann".into()),
            Value::Int(2),
            Value::Text("Bob".into()),
            Value::Null,
        ]
    );
}

#[test]
fn insert_returning_variants() {
    let users = users();
    let base = || insert(&users).values(crate::RowValues::new().set("name", "Dan"));
    assert!(
        base()
            .returning(["id", "name"])
            .sql()
            .unwrap()
            .ends_with(" RETURNING \"id\", \"name\"")
    );
    assert!(base().returning_all().sql().unwrap().ends_with(" RETURNING *"));
    assert!(
        base()
            .returning(Vec::<String>::new())
            .sql()
            .unwrap()
            .ends_with(" RETURNING *")
    );
    assert!(!base().sql().unwrap().contains("RETURNING"));
}

#[test]
fn insert_without_values_is_fatal() {
    let err = insert(&users()).sql().unwrap_err();
    assert!(err.to_string().contains("INSERT"));
}

#[test]
fn insert_unknown_column_is_fatal() {
    let err = insert(&users())
        .values(crate::RowValues::new().set("nope", 1))
        .sql()
        .unwrap_err();
    assert!(err.is_unknown_column());
}

#[test]
fn insert_type_mismatch_is_eager() {
    let users = users();
    let query = insert(&users).values(crate::RowValues::new().set("age", "not-a-number"));
    let err = query.build().unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(err.to_string().contains("age"));
}

#[test]
fn update_keeps_null_assignments() {
    let users = users();
    let (sql, params) = update(&users)
        .set("age", Value::Null)
        .filter(eq(&col(&users, "id"), 5))
        .build()
        .unwrap();
    assert_eq!(sql, "UPDATE \"users\" SET \"age\" = $1 WHERE \"id\" = $2");
    assert_eq!(params, vec![Value::Null, Value::Int(5)]);
}

#[test]
fn update_assignments_precede_where_params() {
    let users = users();
    let (sql, params) = update(&users)
        .set("name", "Mr. Dan")
        .set("age", 30)
        .filter(eq(&col(&users, "name"), "Dan"))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE \"users\" SET \"name\" = $1, \"age\" = $2 WHERE \"name\" = $3"
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn update_without_set_is_fatal() {
    let err = update(&users()).sql().unwrap_err();
    assert!(err.to_string().contains("UPDATE"));
}

#[test]
fn update_type_mismatch_is_eager() {
    let err = update(&users()).set("age", "old").sql().unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(err.to_string().contains("age"));
}

#[test]
fn update_limit_and_returning() {
    let users = users();
    let sql = update(&users)
        .set("age", 1)
        .limit(1)
        .returning_all()
        .sql()
        .unwrap();
    assert_eq!(sql, "UPDATE \"users\" SET \"age\" = $1 LIMIT 1 RETURNING *");
}

#[test]
fn delete_whole_table() {
    let sql = delete(&users()).sql().unwrap();
    assert_eq!(sql, "DELETE FROM \"users\"");
}

#[test]
fn delete_with_filter_and_limit() {
    let users = users();
    let (sql, params) = delete(&users)
        .filter(eq(&col(&users, "name"), "Dan"))
        .limit(3)
        .build()
        .unwrap();
    assert_eq!(sql, "DELETE FROM \"users\" WHERE \"name\" = $1 LIMIT 3");
    assert_eq!(params, vec![Value::Text("Dan".into())]);
}

#[test]
fn delete_returning() {
    let users = users();
    let sql = delete(&users)
        .filter(eq(&col(&users, "id"), 1))
        .returning(["id"])
        .sql()
        .unwrap();
    assert!(sql.ends_with(" RETURNING \"id\""));
}

#[test]
fn model_from_row_materialization() {
    use std::sync::Arc;
    let columns: Arc<[String]> =
        vec!["id".to_string(), "name".to_string(), "age".to_string()].into();
    let row = Row::new(
        columns,
        vec![Value::Int(7), Value::Text("Dan".into()), Value::Null],
    );
    let user = User::from_row("default", &row).unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.name, "Dan");
    assert_eq!(user.age, None);
}
