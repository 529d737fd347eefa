//! INSERT query builder.

use crate::column::push_quoted;
use crate::condition::Placeholder;
use crate::connection::ConnectionAdapter;
use crate::error::{QueryError, QueryResult};
use crate::query::Returning;
use crate::row::Row;
use crate::table::Table;
use crate::value::Value;

/// One row of column -> value assignments, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RowValues {
    entries: Vec<(String, Value)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Setting the same column twice keeps the first
    /// position and overwrites the value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Accepts a single row or a list of rows for [`InsertQuery::values`].
pub trait IntoRows {
    fn into_rows(self) -> Vec<RowValues>;
}

impl IntoRows for RowValues {
    fn into_rows(self) -> Vec<RowValues> {
        vec![self]
    }
}

impl IntoRows for Vec<RowValues> {
    fn into_rows(self) -> Vec<RowValues> {
        self
    }
}

impl<const N: usize> IntoRows for [RowValues; N] {
    fn into_rows(self) -> Vec<RowValues> {
        self.into()
    }
}

/// INSERT query builder.
///
/// The emitted column list is the union of all row keys in first-occurrence
/// order scanning rows left to right; a row missing a column binds NULL for
/// it, so every row emits the same placeholder count.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    table: Table,
    rows: Vec<RowValues>,
    returning: Returning,
    build_error: Option<QueryError>,
}

impl InsertQuery {
    pub(crate) fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            rows: Vec::new(),
            returning: Returning::None,
            build_error: None,
        }
    }

    /// Append one row or a list of rows.
    ///
    /// Value kinds are checked against the table descriptor immediately; the
    /// first mismatch is recorded and surfaces from `build()` before any SQL
    /// text is produced. Column existence is checked later, at build time.
    pub fn values(mut self, rows: impl IntoRows) -> Self {
        let rows = rows.into_rows();
        for row in &rows {
            for (column, value) in row.entries() {
                self.check_kind(column, value);
            }
        }
        self.rows.extend(rows);
        self
    }

    fn check_kind(&mut self, column: &str, value: &Value) {
        if self.build_error.is_some() {
            return;
        }
        if let Some(col) = self.table.get(column) {
            if !col.accepts(value.kind()) {
                self.build_error = Some(QueryError::TypeMismatch {
                    column: column.to_string(),
                    expected: col.accepted_kinds().map(<[_]>::to_vec).unwrap_or_default(),
                    actual: value.kind(),
                });
            }
        }
    }

    /// Request a RETURNING clause over the given fields; an empty list (or a
    /// literal `*`) returns all fields.
    pub fn returning<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = Returning::from_fields(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Request `RETURNING *`.
    pub fn returning_all(mut self) -> Self {
        self.returning = Returning::All;
        self
    }

    /// Build SQL and parameters for a specific placeholder style.
    pub fn build_with(&self, style: Placeholder) -> QueryResult<(String, Vec<Value>)> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        if self.rows.is_empty() {
            return Err(QueryError::configuration(
                "no values specified for INSERT; call values()",
            ));
        }

        // Unified column list: first-occurrence order across all rows.
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for (column, _) in row.entries() {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        for column in &columns {
            if !self.table.has_column(column) {
                return Err(QueryError::unknown_column(*column, self.table.name()));
            }
        }

        let mut sql = String::from("INSERT INTO ");
        let mut params = Vec::new();
        let mut idx = 0;
        push_quoted(&mut sql, self.table.name());
        sql.push_str(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            push_quoted(&mut sql, column);
        }
        sql.push_str(") VALUES ");

        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                style.push(&mut sql, &mut idx);
                params.push(row.get(column).cloned().unwrap_or(Value::Null));
            }
            sql.push(')');
        }

        self.returning.write_sql(&mut sql);
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

    /// Execute on a synchronous connection. Returns the RETURNING rows when
    /// a RETURNING clause was requested, `None` otherwise.
    pub fn execute(&self, conn: &mut ConnectionAdapter) -> QueryResult<Option<Vec<Row>>> {
        let (sql, params) = self.build_with(conn.placeholder())?;
        if self.returning.is_set() {
            Ok(Some(conn.query_sync(&sql, &params)?))
        } else {
            conn.execute_sync(&sql, &params)?;
            Ok(None)
        }
    }

    /// Execute on an asynchronous connection.
    pub async fn execute_async(
        &self,
        conn: &mut ConnectionAdapter,
    ) -> QueryResult<Option<Vec<Row>>> {
        let (sql, params) = self.build_with(conn.placeholder())?;
        if self.returning.is_set() {
            Ok(Some(conn.query_async(&sql, &params).await?))
        } else {
            conn.execute_async(&sql, &params).await?;
            Ok(None)
        }
    }
}
