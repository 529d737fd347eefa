//! UPDATE query builder.

use crate::column::push_quoted;
use crate::condition::{Condition, Placeholder};
use crate::connection::ConnectionAdapter;
use crate::error::{QueryError, QueryResult};
use crate::query::{Returning, validate_conditions, write_where};
use crate::row::Row;
use crate::table::Table;
use crate::value::Value;

/// UPDATE query builder.
///
/// SET parameters come first, in assignment insertion order, followed by
/// WHERE parameters. A NULL assignment is meaningful (sets the column to
/// NULL) and is never filtered out.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    table: Table,
    assignments: Vec<(String, Value)>,
    conditions: Vec<Condition>,
    limit: Option<u64>,
    returning: Returning,
    build_error: Option<QueryError>,
}

impl UpdateQuery {
    pub(crate) fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
            conditions: Vec::new(),
            limit: None,
            returning: Returning::None,
            build_error: None,
        }
    }

    /// Set a column assignment. The value's kind is checked against the
    /// table descriptor immediately; the first mismatch is recorded and
    /// surfaces from `build()` before any SQL text is produced. Assigning
    /// the same column twice keeps the first position and overwrites the
    /// value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if self.build_error.is_none() {
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
        match self.assignments.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = value,
            None => self.assignments.push((column.to_string(), value)),
        }
        self
    }

    /// Append a WHERE condition. Multiple calls accumulate and are joined
    /// with `AND`.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Emit a LIMIT clause verbatim. Engines that reject LIMIT on UPDATE
    /// surface their own error at execution time.
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
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
        if self.assignments.is_empty() {
            return Err(QueryError::configuration(
                "no values specified for UPDATE; call set()",
            ));
        }
        for (column, _) in &self.assignments {
            if !self.table.has_column(column) {
                return Err(QueryError::unknown_column(column, self.table.name()));
            }
        }
        validate_conditions(&self.table, &self.conditions)?;

        let mut sql = String::from("UPDATE ");
        let mut params = Vec::new();
        let mut idx = 0;
        push_quoted(&mut sql, self.table.name());
        sql.push_str(" SET ");
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            push_quoted(&mut sql, column);
            sql.push_str(" = ");
            style.push(&mut sql, &mut idx);
            params.push(value.clone());
        }

        write_where(&self.conditions, style, &mut sql, &mut params, &mut idx);

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
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
