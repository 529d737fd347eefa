//! SQL condition expressions.
//!
//! This module provides the [`Condition`] tree used for WHERE clauses and
//! join predicates, together with named constructors (`eq`, `lt`, `in_array`,
//! `and_`, ...). Rendering is pure string/parameter assembly: identifiers are
//! always double-quote delimited and values are always emitted as positional
//! placeholders, never interpolated.
//!
//! The key invariant is that a condition's flattened parameter list aligns
//! positionally with the placeholders its rendering emits, left to right.

use crate::column::Column;
use crate::value::Value;

/// Positional placeholder syntax used by a driver family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
    /// `?` (MySQL)
    Question,
}

impl Placeholder {
    pub(crate) fn push(self, out: &mut String, idx: &mut usize) {
        *idx += 1;
        match self {
            Placeholder::Numbered => {
                out.push('$');
                out.push_str(&idx.to_string());
            }
            Placeholder::Question => out.push('?'),
        }
    }
}

/// Comparison operator for a [`Condition::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Ilike,
}

impl CmpOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Like => "LIKE",
            CmpOp::Ilike => "ILIKE",
        }
    }
}

/// Boolean connective for a [`Condition::Compound`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

/// Right-hand side of a comparison: a bound scalar, or another column.
///
/// A column operand renders as a second delimited identifier with no
/// parameter. This is the join-predicate path and the only way a comparison
/// contributes zero parameters.
#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Column(Column),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Column(c.clone())
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Column(c)
    }
}

macro_rules! operand_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from_scalar!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    &str,
    String,
    Vec<u8>,
    serde_json::Value,
    uuid::Uuid,
);

/// A SQL WHERE condition.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `"col" <op> $n` or, for a column operand, `"col" <op> "other"`
    Compare {
        column: Column,
        op: CmpOp,
        value: Operand,
    },
    /// `"col" IS NULL` / `"col" IS NOT NULL`; contributes no parameters
    NullCheck { column: Column, negated: bool },
    /// `"col" IN ($1, $2, ...)` / `NOT IN (...)`, one placeholder per value
    /// in sequence order. An empty value list renders `IN ()` verbatim.
    InList {
        column: Column,
        values: Vec<Value>,
        negated: bool,
    },
    /// `"col" BETWEEN $n AND $m`, parameters in `(low, high)` order
    Between {
        column: Column,
        low: Value,
        high: Value,
    },
    /// Children rendered parenthesized and joined by ` AND ` / ` OR `;
    /// parameters are the flattened concatenation of each child's parameters
    Compound {
        op: BoolOp,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Render this condition to a SQL fragment plus its bound parameters.
    ///
    /// Pure and idempotent: rendering twice yields identical output.
    pub fn render(&self, style: Placeholder) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut idx = 0;
        self.write_sql(&mut sql, &mut params, style, &mut idx);
        (sql, params)
    }

    pub(crate) fn write_sql(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        style: Placeholder,
        idx: &mut usize,
    ) {
        match self {
            Condition::Compare { column, op, value } => {
                sql.push_str(&column.full_name());
                sql.push(' ');
                sql.push_str(op.as_sql());
                sql.push(' ');
                match value {
                    Operand::Column(other) => sql.push_str(&other.full_name()),
                    Operand::Value(v) => {
                        style.push(sql, idx);
                        params.push(v.clone());
                    }
                }
            }
            Condition::NullCheck { column, negated } => {
                sql.push_str(&column.full_name());
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::InList {
                column,
                values,
                negated,
            } => {
                sql.push_str(&column.full_name());
                sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    style.push(sql, idx);
                    params.push(v.clone());
                }
                sql.push(')');
            }
            Condition::Between { column, low, high } => {
                sql.push_str(&column.full_name());
                sql.push_str(" BETWEEN ");
                style.push(sql, idx);
                params.push(low.clone());
                sql.push_str(" AND ");
                style.push(sql, idx);
                params.push(high.clone());
            }
            Condition::Compound { op, conditions } => {
                for (i, cond) in conditions.iter().enumerate() {
                    if i > 0 {
                        sql.push(' ');
                        sql.push_str(op.as_sql());
                        sql.push(' ');
                    }
                    sql.push('(');
                    cond.write_sql(sql, params, style, idx);
                    sql.push(')');
                }
            }
        }
    }

    /// Visit every left-hand column in this tree, depth-first.
    pub(crate) fn visit_columns<'a>(&'a self, f: &mut impl FnMut(&'a Column)) {
        match self {
            Condition::Compare { column, .. }
            | Condition::NullCheck { column, .. }
            | Condition::InList { column, .. }
            | Condition::Between { column, .. } => f(column),
            Condition::Compound { conditions, .. } => {
                for cond in conditions {
                    cond.visit_columns(f);
                }
            }
        }
    }
}

fn compare(column: &Column, op: CmpOp, value: impl Into<Operand>) -> Condition {
    Condition::Compare {
        column: column.clone(),
        op,
        value: value.into(),
    }
}

/// `column = value`
pub fn eq(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Eq, value)
}

/// `column <> value`
pub fn ne(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Ne, value)
}

/// `column < value`
pub fn lt(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Lt, value)
}

/// `column <= value`
pub fn lte(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Lte, value)
}

/// `column > value`
pub fn gt(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Gt, value)
}

/// `column >= value`
pub fn gte(column: &Column, value: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Gte, value)
}

/// Pattern matching with LIKE.
pub fn like(column: &Column, pattern: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Like, pattern)
}

/// Case-insensitive pattern matching with ILIKE (PostgreSQL).
pub fn ilike(column: &Column, pattern: impl Into<Operand>) -> Condition {
    compare(column, CmpOp::Ilike, pattern)
}

/// `column IS NULL`
pub fn is_null(column: &Column) -> Condition {
    Condition::NullCheck {
        column: column.clone(),
        negated: false,
    }
}

/// `column IS NOT NULL`
pub fn is_not_null(column: &Column) -> Condition {
    Condition::NullCheck {
        column: column.clone(),
        negated: true,
    }
}

/// `column IN (values...)`
pub fn in_array(
    column: &Column,
    values: impl IntoIterator<Item = impl Into<Value>>,
) -> Condition {
    Condition::InList {
        column: column.clone(),
        values: values.into_iter().map(Into::into).collect(),
        negated: false,
    }
}

/// `column NOT IN (values...)`
pub fn not_in_array(
    column: &Column,
    values: impl IntoIterator<Item = impl Into<Value>>,
) -> Condition {
    Condition::InList {
        column: column.clone(),
        values: values.into_iter().map(Into::into).collect(),
        negated: true,
    }
}

/// `column BETWEEN low AND high` (inclusive).
pub fn between(column: &Column, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
    Condition::Between {
        column: column.clone(),
        low: low.into(),
        high: high.into(),
    }
}

/// Combine conditions with AND logic.
///
/// Each child renders parenthesized: `(a = $1) AND (b = $2)`.
pub fn and_(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Compound {
        op: BoolOp::And,
        conditions: conditions.into_iter().collect(),
    }
}

/// Combine conditions with OR logic.
pub fn or_(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Compound {
        op: BoolOp::Or,
        conditions: conditions.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Column {
        Column::new("users", name)
    }

    #[test]
    fn simple_eq() {
        let (sql, params) = eq(&col("id"), 42).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" = $1");
        assert_eq!(params, vec![Value::Int(42)]);
    }

    #[test]
    fn question_style() {
        let (sql, params) = eq(&col("id"), 42).render(Placeholder::Question);
        assert_eq!(sql, "\"id\" = ?");
        assert_eq!(params, vec![Value::Int(42)]);
    }

    #[test]
    fn render_is_idempotent() {
        let cond = or_([
            eq(&col("a"), 1),
            and_([eq(&col("b"), 2), between(&col("c"), 3, 4)]),
        ]);
        let first = cond.render(Placeholder::Numbered);
        let second = cond.render(Placeholder::Numbered);
        assert_eq!(first, second);
    }

    #[test]
    fn all_comparison_operators() {
        assert_eq!(ne(&col("a"), 1).render(Placeholder::Numbered).0, "\"a\" <> $1");
        assert_eq!(lt(&col("a"), 1).render(Placeholder::Numbered).0, "\"a\" < $1");
        assert_eq!(lte(&col("a"), 1).render(Placeholder::Numbered).0, "\"a\" <= $1");
        assert_eq!(gt(&col("a"), 1).render(Placeholder::Numbered).0, "\"a\" > $1");
        assert_eq!(gte(&col("a"), 1).render(Placeholder::Numbered).0, "\"a\" >= $1");
        assert_eq!(
            like(&col("a"), "x%").render(Placeholder::Numbered).0,
            "\"a\" LIKE $1"
        );
        assert_eq!(
            ilike(&col("a"), "x%").render(Placeholder::Numbered).0,
            "\"a\" ILIKE $1"
        );
    }

    #[test]
    fn column_to_column_has_no_params() {
        let owner = Column::new("pets", "owner_id");
        let (sql, params) = eq(&col("id"), &owner).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" = \"owner_id\"");
        assert!(params.is_empty());
    }

    #[test]
    fn null_checks() {
        let (sql, params) = is_null(&col("deleted_at")).render(Placeholder::Numbered);
        assert_eq!(sql, "\"deleted_at\" IS NULL");
        assert!(params.is_empty());
        let (sql, _) = is_not_null(&col("deleted_at")).render(Placeholder::Numbered);
        assert_eq!(sql, "\"deleted_at\" IS NOT NULL");
    }

    #[test]
    fn in_list() {
        let (sql, params) = in_array(&col("id"), [1, 2, 3]).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" IN ($1, $2, $3)");
        assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn not_in_list() {
        let (sql, _) = not_in_array(&col("id"), [1, 2]).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" NOT IN ($1, $2)");
    }

    #[test]
    fn empty_in_list_renders_verbatim() {
        let (sql, params) =
            in_array(&col("id"), Vec::<i64>::new()).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" IN ()");
        assert!(params.is_empty());
        let (sql, _) = not_in_array(&col("id"), Vec::<i64>::new()).render(Placeholder::Numbered);
        assert_eq!(sql, "\"id\" NOT IN ()");
    }

    #[test]
    fn between_param_order() {
        let (sql, params) = between(&col("age"), 18, 65).render(Placeholder::Numbered);
        assert_eq!(sql, "\"age\" BETWEEN $1 AND $2");
        assert_eq!(params, vec![Value::Int(18), Value::Int(65)]);
    }

    #[test]
    fn compound_nesting_and_param_flattening() {
        let cond = or_([
            eq(&col("a"), 1),
            and_([eq(&col("b"), 2), eq(&col("c"), 3)]),
        ]);
        let (sql, params) = cond.render(Placeholder::Numbered);
        assert_eq!(sql, "(\"a\" = $1) OR ((\"b\" = $2) AND (\"c\" = $3))");
        assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn compound_skips_params_of_null_checks() {
        let cond = and_([is_null(&col("a")), eq(&col("b"), 9)]);
        let (sql, params) = cond.render(Placeholder::Numbered);
        assert_eq!(sql, "(\"a\" IS NULL) AND (\"b\" = $1)");
        assert_eq!(params, vec![Value::Int(9)]);
    }
}
