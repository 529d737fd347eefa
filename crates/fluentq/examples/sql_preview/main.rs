//! Build statements and print their SQL and parameters without a database.
//!
//! Run with: cargo run --example sql_preview

use fluentq::{
    FieldDef, FieldKind, Model, QueryResult, Row, RowValues, Table, Value, and_, between, delete,
    desc, eq, insert, or_, select, update,
};

struct User;

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
        ]
    }

    fn from_row(_db_alias: &str, _row: &Row) -> QueryResult<Self> {
        Ok(User)
    }
}

fn main() -> QueryResult<()> {
    let users = Table::from_model::<User>();
    let id = users.column("id")?;
    let name = users.column("name")?;
    let age = users.column("age")?;

    let query = select(["id", "name as who"])
        .from(&users)
        .filter(or_([
            eq(name, "Dan"),
            and_([between(age, 18, 65), eq(id, 42)]),
        ]))
        .order_by(desc(name))
        .limit(5);
    println!("{}", query.sql()?);
    println!("  params: {:?}\n", query.params()?);

    let query = insert(&users)
        .values(vec![
            RowValues::new().set("name", "Andrew").set("age", 25),
            RowValues::new().set("name", "Dan"),
        ])
        .returning(["id"]);
    println!("{}", query.sql()?);
    println!("  params: {:?}\n", query.params()?);

    let query = update(&users)
        .set("age", Value::Null)
        .filter(eq(name, "Dan"));
    println!("{}", query.sql()?);
    println!("  params: {:?}\n", query.params()?);

    let query = delete(&users).filter(eq(id, 42)).returning_all();
    println!("{}", query.sql()?);
    println!("  params: {:?}", query.params()?);

    Ok(())
}
