//! SELECT query builder.

use crate::column::push_quoted;
use crate::condition::{Condition, Placeholder};
use crate::connection::ConnectionAdapter;
use crate::error::{QueryError, QueryResult};
use crate::query::{OrderTerm, SelectItem, validate_conditions, write_where};
use crate::row::Row;
use crate::table::{Model, Table};
use crate::value::Value;

/// Join variant, emitted verbatim before `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Right,
    Inner,
    Full,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// SELECT query builder.
///
/// Clause assembly order is fixed: field list, FROM, joins in insertion
/// order, WHERE, ORDER BY, LIMIT, OFFSET. Join and WHERE parameters are
/// appended in the same order their clauses are emitted.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: Option<Table>,
    fields: Vec<SelectItem>,
    distinct: bool,
    conditions: Vec<Condition>,
    joins: Vec<(JoinKind, Table, Condition)>,
    order: Vec<OrderTerm>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    pub(crate) fn new(fields: Vec<SelectItem>, distinct: bool) -> Self {
        Self {
            table: None,
            fields,
            distinct,
            conditions: Vec::new(),
            joins: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Bind the table to select from. Required before building.
    pub fn from(mut self, table: &Table) -> Self {
        self.table = Some(table.clone());
        self
    }

    /// Toggle the DISTINCT keyword.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append a WHERE condition. Multiple calls accumulate and are joined
    /// with `AND`.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn join(mut self, kind: JoinKind, table: &Table, on: Condition) -> Self {
        self.joins.push((kind, table.clone(), on));
        self
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Add a RIGHT JOIN.
    pub fn right_join(self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Add a FULL JOIN.
    pub fn full_join(self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    /// Append an ORDER BY entry; a bare column defaults to ascending.
    pub fn order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        self.order.push(term.into());
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn offset(mut self, count: u64) -> Self {
        self.offset = Some(count);
        self
    }

    fn validate(&self, table: &Table) -> QueryResult<()> {
        for item in &self.fields {
            if let Some(name) = item.name_to_validate() {
                if !table.has_column(&name) {
                    return Err(QueryError::unknown_column(name, table.name()));
                }
            }
        }
        validate_conditions(table, &self.conditions)?;
        for term in &self.order {
            if !table.has_column(term.column_name()) {
                return Err(QueryError::unknown_column(term.column_name(), table.name()));
            }
        }
        Ok(())
    }

    /// Build SQL and parameters for a specific placeholder style.
    pub fn build_with(&self, style: Placeholder) -> QueryResult<(String, Vec<Value>)> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| QueryError::configuration("no table selected; call from() first"))?;
        self.validate(table)?;

        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();
        let mut idx = 0;

        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.fields.is_empty() {
            sql.push('*');
        } else {
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                field.write_sql(&mut sql);
            }
        }
        sql.push_str(" FROM ");
        push_quoted(&mut sql, table.name());

        for (kind, join_table, on) in &self.joins {
            sql.push(' ');
            sql.push_str(kind.as_sql());
            sql.push(' ');
            push_quoted(&mut sql, join_table.name());
            sql.push_str(" ON ");
            on.write_sql(&mut sql, &mut params, style, &mut idx);
        }

        write_where(&self.conditions, style, &mut sql, &mut params, &mut idx);

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, term) in self.order.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                term.write_sql(&mut sql);
            }
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }

        Ok((sql, params))
    }

    /// Build SQL and parameters (`$n` placeholder style).
    pub fn build(&self) -> QueryResult<(String, Vec<Value>)> {
        self.build_with(Placeholder::Numbered)
    }

    /// The SQL string, built without executing.
    pub fn sql(&self) -> QueryResult<String> {
        Ok(self.build()?.0)
    }

    /// The parameter list, built without executing.
    pub fn params(&self) -> QueryResult<Vec<Value>> {
        Ok(self.build()?.1)
    }

    /// Execute on a synchronous connection and return generic rows.
    pub fn fetch(&self, conn: &mut ConnectionAdapter) -> QueryResult<Vec<Row>> {
        let (sql, params) = self.build_with(conn.placeholder())?;
        conn.query_sync(&sql, &params)
    }

    /// Execute on an asynchronous connection and return generic rows.
    pub async fn fetch_async(&self, conn: &mut ConnectionAdapter) -> QueryResult<Vec<Row>> {
        let (sql, params) = self.build_with(conn.placeholder())?;
        conn.query_async(&sql, &params).await
    }

    /// Execute on a synchronous connection, materializing model instances
    /// tagged with the adapter's database alias.
    pub fn fetch_as<M: Model>(&self, conn: &mut ConnectionAdapter) -> QueryResult<Vec<M>> {
        let rows = self.fetch(conn)?;
        let alias = conn.db_alias();
        rows.iter().map(|row| M::from_row(alias, row)).collect()
    }

    /// Execute on an asynchronous connection, materializing model instances.
    pub async fn fetch_as_async<M: Model>(
        &self,
        conn: &mut ConnectionAdapter,
    ) -> QueryResult<Vec<M>> {
        let rows = self.fetch_async(conn).await?;
        let alias = conn.db_alias();
        rows.iter().map(|row| M::from_row(alias, row)).collect()
    }
}
