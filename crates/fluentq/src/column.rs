//! Column references, ordering directives, and aliases.

use crate::value::ValueKind;

/// Append `name` as a double-quote delimited identifier, escaping embedded
/// quotes by doubling them.
pub(crate) fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

pub(crate) fn quoted(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    push_quoted(&mut out, name);
    out
}

/// A reference to a table column.
///
/// Carries optional accepted-kind metadata used only for value validation;
/// rendering never consults it. Created by [`Table`](crate::Table)
/// construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    table_name: String,
    column_name: String,
    accepted: Option<Vec<ValueKind>>,
}

impl Column {
    /// Create a column reference accepting any value kind.
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            accepted: None,
        }
    }

    pub(crate) fn with_kinds(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        accepted: Vec<ValueKind>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            accepted: Some(accepted),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn name(&self) -> &str {
        &self.column_name
    }

    /// The delimited SQL rendering of this column (`"name"`).
    pub fn full_name(&self) -> String {
        quoted(&self.column_name)
    }

    /// Whether `kind` is acceptable for this column. Columns without
    /// accepted-kind metadata accept everything.
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match &self.accepted {
            None => true,
            Some(kinds) => kinds.contains(&kind),
        }
    }

    pub(crate) fn accepted_kinds(&self) -> Option<&[ValueKind]> {
        self.accepted.as_deref()
    }

    /// Create an aliased version of this column for use in SELECT.
    pub fn alias(&self, alias_name: impl Into<String>) -> Alias {
        Alias {
            column: self.clone(),
            alias_name: alias_name.into(),
        }
    }
}

/// Sort direction for an ORDER BY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A column with an order direction.
#[derive(Debug, Clone)]
pub struct OrderBy {
    column: Column,
    direction: Direction,
}

impl OrderBy {
    pub fn new(column: &Column, direction: Direction) -> Self {
        Self {
            column: column.clone(),
            direction,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column.full_name(), self.direction.as_sql())
    }
}

/// A column with an alias, rendering `"col" AS "alias"`.
#[derive(Debug, Clone)]
pub struct Alias {
    column: Column,
    alias_name: String,
}

impl Alias {
    pub fn to_sql(&self) -> String {
        format!("{} AS {}", self.column.full_name(), quoted(&self.alias_name))
    }
}

/// Create an ascending order directive for a column.
pub fn asc(column: &Column) -> OrderBy {
    OrderBy::new(column, Direction::Asc)
}

/// Create a descending order directive for a column.
pub fn desc(column: &Column) -> OrderBy {
    OrderBy::new(column, Direction::Desc)
}

/// Create an aliased column for use in SELECT.
pub fn alias(column: &Column, alias_name: impl Into<String>) -> Alias {
    Alias {
        column: column.clone(),
        alias_name: alias_name.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_is_delimited() {
        let col = Column::new("users", "name");
        assert_eq!(col.full_name(), "\"name\"");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        let col = Column::new("users", "we\"ird");
        assert_eq!(col.full_name(), "\"we\"\"ird\"");
    }

    #[test]
    fn order_directions() {
        let col = Column::new("users", "age");
        assert_eq!(asc(&col).to_sql(), "\"age\" ASC");
        assert_eq!(desc(&col).to_sql(), "\"age\" DESC");
    }

    #[test]
    fn alias_rendering() {
        let col = Column::new("users", "name");
        assert_eq!(col.alias("my_name").to_sql(), "\"name\" AS \"my_name\"");
        assert_eq!(alias(&col, "n").to_sql(), "\"name\" AS \"n\"");
    }

    #[test]
    fn accepts_without_metadata() {
        let col = Column::new("users", "anything");
        assert!(col.accepts(ValueKind::Text));
        assert!(col.accepts(ValueKind::Json));
    }

    #[test]
    fn accepts_with_metadata() {
        let col = Column::with_kinds("users", "age", vec![ValueKind::Int, ValueKind::Null]);
        assert!(col.accepts(ValueKind::Int));
        assert!(col.accepts(ValueKind::Null));
        assert!(!col.accepts(ValueKind::Text));
    }
}
