//! Fluent query builders.
//!
//! One builder type per statement kind, sharing the condition/column
//! vocabulary. Each verb entry point constructs a fresh builder, so starting
//! a new statement never inherits clause state from a previous one.
//!
//! # Usage
//!
//! ```ignore
//! use fluentq::{eq, desc, select, insert, update, delete, RowValues, Table};
//!
//! let users = Table::from_model::<User>();
//!
//! // SELECT
//! let rows = select(["id", "name"])
//!     .from(&users)
//!     .filter(eq(users.column("age")?, 20))
//!     .order_by(desc(users.column("name")?))
//!     .limit(10)
//!     .fetch(&mut conn)?;
//!
//! // INSERT
//! insert(&users)
//!     .values(RowValues::new().set("name", "Andrew").set("age", 25))
//!     .returning(["id"])
//!     .execute(&mut conn)?;
//!
//! // UPDATE
//! update(&users)
//!     .set("age", 30)
//!     .filter(eq(users.column("name")?, "Dan"))
//!     .execute(&mut conn)?;
//!
//! // DELETE
//! delete(&users)
//!     .filter(eq(users.column("id")?, 7))
//!     .execute(&mut conn)?;
//! ```
//!
//! The parameter list a builder produces is ordered to align exactly,
//! left to right, with the placeholders in the produced SQL string.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteQuery;
pub use insert::{InsertQuery, IntoRows, RowValues};
pub use select::{JoinKind, SelectQuery};
pub use update::UpdateQuery;

use crate::column::{Alias, Column, OrderBy, push_quoted};
use crate::condition::{Condition, Placeholder};
use crate::error::{QueryError, QueryResult};
use crate::table::Table;
use crate::value::Value;

/// Create a SELECT query over the given fields (empty slice = `*`).
///
/// Fields may be plain names, qualified `table.column` strings,
/// `name as alias` strings, [`Column`]s, or [`Alias`]es.
pub fn select<I, S>(fields: I) -> SelectQuery
where
    I: IntoIterator<Item = S>,
    S: Into<SelectItem>,
{
    SelectQuery::new(fields.into_iter().map(Into::into).collect(), false)
}

/// Create a `SELECT *` query.
pub fn select_all() -> SelectQuery {
    SelectQuery::new(Vec::new(), false)
}

/// Create a SELECT DISTINCT query over the given fields.
pub fn select_distinct<I, S>(fields: I) -> SelectQuery
where
    I: IntoIterator<Item = S>,
    S: Into<SelectItem>,
{
    SelectQuery::new(fields.into_iter().map(Into::into).collect(), true)
}

/// Start an INSERT query for the given table.
pub fn insert(table: &Table) -> InsertQuery {
    InsertQuery::new(table)
}

/// Start an UPDATE query for the given table.
pub fn update(table: &Table) -> UpdateQuery {
    UpdateQuery::new(table)
}

/// Start a DELETE query for the given table.
pub fn delete(table: &Table) -> DeleteQuery {
    DeleteQuery::new(table)
}

/// One entry in a SELECT field list.
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// A raw string field, parsed for `table.column` and `name as alias`
    Name(String),
    Column(Column),
    Aliased(Alias),
}

impl From<&str> for SelectItem {
    fn from(s: &str) -> Self {
        SelectItem::Name(s.to_string())
    }
}

impl From<String> for SelectItem {
    fn from(s: String) -> Self {
        SelectItem::Name(s)
    }
}

impl From<&Column> for SelectItem {
    fn from(c: &Column) -> Self {
        SelectItem::Column(c.clone())
    }
}

impl From<Column> for SelectItem {
    fn from(c: Column) -> Self {
        SelectItem::Column(c)
    }
}

impl From<Alias> for SelectItem {
    fn from(a: Alias) -> Self {
        SelectItem::Aliased(a)
    }
}

impl SelectItem {
    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            SelectItem::Column(c) => out.push_str(&c.full_name()),
            SelectItem::Aliased(a) => out.push_str(&a.to_sql()),
            SelectItem::Name(raw) => {
                if let Some((col_part, alias_part)) = split_alias(raw) {
                    write_qualified(out, &col_part);
                    out.push_str(" AS ");
                    push_quoted(out, &alias_part);
                } else {
                    write_qualified(out, raw);
                }
            }
        }
    }

    /// The bare name to existence-check, if any. Column/Alias entries and
    /// qualified string references are exempt.
    pub(crate) fn name_to_validate(&self) -> Option<String> {
        let SelectItem::Name(raw) = self else {
            return None;
        };
        let name = match split_alias(raw) {
            Some((col_part, _)) => col_part,
            None => raw.clone(),
        };
        if name.contains('.') { None } else { Some(name) }
    }
}

/// Split a `name as alias` string field, case-insensitively on the `as`
/// token. Returns `(column_part, alias_part)`.
fn split_alias(raw: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let as_index = tokens
        .iter()
        .position(|token| token.eq_ignore_ascii_case("as"))?;
    let alias_part = tokens.get(as_index + 1)?;
    Some((tokens[..as_index].join(" "), (*alias_part).to_string()))
}

/// Render a possibly `table.column` qualified string reference.
fn write_qualified(out: &mut String, part: &str) {
    if let Some((table, column)) = part.rsplit_once('.') {
        push_quoted(out, table);
        out.push('.');
        push_quoted(out, column);
    } else {
        push_quoted(out, part);
    }
}

/// One entry in an ORDER BY list; a bare column defaults to ascending.
#[derive(Debug, Clone)]
pub enum OrderTerm {
    Column(Column),
    Directed(OrderBy),
}

impl From<&Column> for OrderTerm {
    fn from(c: &Column) -> Self {
        OrderTerm::Column(c.clone())
    }
}

impl From<Column> for OrderTerm {
    fn from(c: Column) -> Self {
        OrderTerm::Column(c)
    }
}

impl From<OrderBy> for OrderTerm {
    fn from(o: OrderBy) -> Self {
        OrderTerm::Directed(o)
    }
}

impl OrderTerm {
    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            OrderTerm::Column(c) => {
                out.push_str(&c.full_name());
                out.push_str(" ASC");
            }
            OrderTerm::Directed(o) => out.push_str(&o.to_sql()),
        }
    }

    pub(crate) fn column_name(&self) -> &str {
        match self {
            OrderTerm::Column(c) => c.name(),
            OrderTerm::Directed(o) => o.column().name(),
        }
    }
}

/// RETURNING clause state. Absent = no clause, `All` = the `*` sentinel.
#[derive(Debug, Clone, Default)]
pub(crate) enum Returning {
    #[default]
    None,
    All,
    Fields(Vec<String>),
}

impl Returning {
    pub(crate) fn from_fields(fields: Vec<String>) -> Self {
        if fields.is_empty() || fields.iter().any(|f| f == "*") {
            Returning::All
        } else {
            Returning::Fields(fields)
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        !matches!(self, Returning::None)
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Returning::None => {}
            Returning::All => out.push_str(" RETURNING *"),
            Returning::Fields(fields) => {
                out.push_str(" RETURNING ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    push_quoted(out, field);
                }
            }
        }
    }
}

/// Append the WHERE clause: conditions in insertion order, joined by `AND`,
/// parameters appended in the same order.
pub(crate) fn write_where(
    conditions: &[Condition],
    style: Placeholder,
    sql: &mut String,
    params: &mut Vec<Value>,
    idx: &mut usize,
) {
    if conditions.is_empty() {
        return;
    }
    sql.push_str(" WHERE ");
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        cond.write_sql(sql, params, style, idx);
    }
}

/// Existence-check every column referenced by `conditions` against `table`,
/// recursing into compound conditions depth-first.
pub(crate) fn validate_conditions(table: &Table, conditions: &[Condition]) -> QueryResult<()> {
    for cond in conditions {
        let mut unknown: Option<&Column> = None;
        cond.visit_columns(&mut |col| {
            if unknown.is_none() && !table.has_column(col.name()) {
                unknown = Some(col);
            }
        });
        if let Some(col) = unknown {
            return Err(QueryError::unknown_column(col.name(), table.name()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
