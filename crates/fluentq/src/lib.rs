//! # fluentq
//!
//! A fluent, model-aware SQL query builder with pluggable sync/async drivers.
//!
//! ## Features
//!
//! - **Injection-safe by construction**: identifiers are always delimited and
//!   values always travel as positional bind parameters, never interpolated
//! - **Composable conditions**: comparison, NULL check, set membership, range,
//!   and AND/OR compounds, with parameters flattened in placeholder order
//! - **Schema-aware validation**: column references and value kinds are
//!   checked against a [`Table`] descriptor built once from model metadata
//! - **One execution contract**: a [`ConnectionAdapter`] classifies the
//!   driver handle it wraps and exposes blocking and suspending paths, each
//!   failing fast when called against the wrong mode
//! - **Typed or generic results**: fetch generic [`Row`] mappings, or
//!   materialize [`Model`] instances via the model's raw-row constructor
//!
//! ## Query building
//!
//! ```ignore
//! use fluentq::{Table, eq, desc, select};
//!
//! let users = Table::from_model::<User>();
//!
//! let query = select(["id", "name"])
//!     .from(&users)
//!     .filter(eq(users.column("age")?, 20))
//!     .order_by(desc(users.column("name")?))
//!     .limit(10);
//!
//! // Introspect without executing:
//! println!("{}", query.sql()?);     // SELECT "id", "name" FROM "users" WHERE "age" = $1 ...
//! println!("{:?}", query.params()?); // [Int(20)]
//!
//! // Or execute:
//! let mut conn = fluentq::ConnectionAdapter::from(pg_client);
//! let rows = query.fetch(&mut conn)?;
//! ```
//!
//! ## Connections
//!
//! The adapter accepts `postgres::Client` and `mysql::Conn` (blocking),
//! `tokio_postgres::Client` and `mysql_async::Conn` (async), and an
//! already-checked-out `deadpool_postgres::Client`. The driver family is
//! fixed at construction; `fetch`/`execute` serve the blocking families and
//! `fetch_async`/`execute_async` the async ones.

pub mod column;
pub mod condition;
pub mod connection;
pub mod error;
pub mod query;
pub mod row;
pub mod table;
pub mod value;

pub use column::{Alias, Column, Direction, OrderBy, alias, asc, desc};
pub use condition::{
    BoolOp, CmpOp, Condition, Operand, Placeholder, and_, between, eq, gt, gte, ilike, in_array,
    is_not_null, is_null, like, lt, lte, ne, not_in_array, or_,
};
pub use connection::{ConnectionAdapter, DriverFamily};
pub use error::{QueryError, QueryResult};
pub use query::{
    DeleteQuery, InsertQuery, IntoRows, JoinKind, OrderTerm, RowValues, SelectItem, SelectQuery,
    UpdateQuery, delete, insert, select, select_all, select_distinct, update,
};
pub use row::Row;
pub use table::{FieldDef, FieldKind, Model, Table};
pub use value::{Value, ValueKind};
