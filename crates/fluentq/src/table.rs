//! Table descriptors built from model metadata.
//!
//! [`Model`] is the contract the host model layer implements: table name,
//! ordered field metadata, and a raw-row constructor. [`Table`] is the
//! read-only schema descriptor derived from it once, consumed by the query
//! builders for column and value-kind validation.

use crate::column::Column;
use crate::error::{QueryError, QueryResult};
use crate::row::Row;
use crate::value::ValueKind;

/// Declared kind of a model field, as reported by the model layer.
///
/// Unknown kinds validate permissively rather than failing: the validator is
/// an aid, not a gatekeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    Boolean,
    Binary,
    Json,
    Uuid,
    Unknown,
}

impl FieldKind {
    /// The accepted value kinds for a column of this declared kind, before
    /// the nullable union. `None` means "accept any kind".
    fn accepted_kinds(self) -> Option<Vec<ValueKind>> {
        let kinds = match self {
            FieldKind::Text => vec![ValueKind::Text],
            FieldKind::Integer => vec![ValueKind::Int],
            FieldKind::Real => vec![ValueKind::Real, ValueKind::Int],
            FieldKind::Boolean => vec![ValueKind::Bool],
            FieldKind::Binary => vec![ValueKind::Bytes],
            FieldKind::Json => vec![ValueKind::Json],
            FieldKind::Uuid => vec![ValueKind::Uuid, ValueKind::Text],
            FieldKind::Unknown => return None,
        };
        Some(kinds)
    }
}

/// One field of a model, as exposed by [`Model::fields`].
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Logical field name
    pub name: &'static str,
    /// Physical column name, or `None` for fields without a column
    pub column: Option<&'static str>,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Relation fields additionally register a `<name>_id` shadow entry
    /// pointing at the same foreign-key column
    pub relation: bool,
}

/// The external model collaborator contract.
pub trait Model: Sized {
    /// Physical table name.
    fn table_name() -> &'static str;

    /// Ordered field metadata, in schema declaration order.
    fn fields() -> Vec<FieldDef>;

    /// Construct an instance from a raw result row, bypassing normal
    /// construction. `db_alias` identifies the connection the row came from.
    fn from_row(db_alias: &str, row: &Row) -> QueryResult<Self>;
}

/// Read-only schema descriptor for one table.
///
/// Holds the physical table name and an ordered `logical name -> Column`
/// mapping (insertion order = declaration order). Query builders clone the
/// descriptor they are given and never mutate it.
#[derive(Debug, Clone)]
pub struct Table {
    db_table_name: String,
    columns: Vec<(String, Column)>,
}

impl Table {
    /// Build a descriptor from a model's metadata.
    pub fn from_model<M: Model>() -> Self {
        let db_table_name = M::table_name().to_string();
        let mut columns: Vec<(String, Column)> = Vec::new();

        for field in M::fields() {
            let Some(physical) = field.column else {
                continue;
            };
            let col = match field.kind.accepted_kinds() {
                Some(mut kinds) => {
                    if field.nullable {
                        kinds.push(ValueKind::Null);
                    }
                    Column::with_kinds(&db_table_name, physical, kinds)
                }
                None => Column::new(&db_table_name, physical),
            };
            columns.push((field.name.to_string(), col.clone()));

            if field.relation {
                let shadow = format!("{}_id", field.name);
                if !columns.iter().any(|(name, _)| *name == shadow) {
                    columns.push((shadow, col));
                }
            }
        }

        Self {
            db_table_name,
            columns,
        }
    }

    /// The physical table name.
    pub fn name(&self) -> &str {
        &self.db_table_name
    }

    /// Look up a column by logical name, failing with an unknown-column
    /// error naming this table.
    pub fn column(&self, name: &str) -> QueryResult<&Column> {
        self.get(name)
            .ok_or_else(|| QueryError::unknown_column(name, &self.db_table_name))
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(logical, _)| logical == name)
            .map(|(_, col)| col)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(logical, _)| logical == name)
    }

    /// Logical column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
                FieldDef {
                    name: "profile",
                    column: Some("profile"),
                    kind: FieldKind::Unknown,
                    nullable: true,
                    relation: false,
                },
                FieldDef {
                    name: "group",
                    column: Some("group_id"),
                    kind: FieldKind::Integer,
                    nullable: true,
                    relation: true,
                },
            ]
        }

        fn from_row(_db_alias: &str, _row: &Row) -> QueryResult<Self> {
            Ok(User)
        }
    }

    #[test]
    fn describe_registers_columns_in_order() {
        let table = Table::from_model::<User>();
        assert_eq!(table.name(), "users");
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["id", "name", "age", "profile", "group", "group_id"]);
    }

    #[test]
    fn relation_registers_id_shadow() {
        let table = Table::from_model::<User>();
        let shadow = table.column("group_id").unwrap();
        assert_eq!(shadow.name(), "group_id");
        let direct = table.column("group").unwrap();
        assert_eq!(direct.name(), "group_id");
    }

    #[test]
    fn nullable_unions_null_kind() {
        let table = Table::from_model::<User>();
        let age = table.column("age").unwrap();
        assert!(age.accepts(ValueKind::Int));
        assert!(age.accepts(ValueKind::Null));
        assert!(!age.accepts(ValueKind::Text));

        let id = table.column("id").unwrap();
        assert!(!id.accepts(ValueKind::Null));
    }

    #[test]
    fn unknown_kind_accepts_anything() {
        let table = Table::from_model::<User>();
        let profile = table.column("profile").unwrap();
        assert!(profile.accepts(ValueKind::Json));
        assert!(profile.accepts(ValueKind::Int));
    }

    #[test]
    fn unknown_column_error_names_table() {
        let table = Table::from_model::<User>();
        let err = table.column("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column missing not in table users"
        );
    }
}
