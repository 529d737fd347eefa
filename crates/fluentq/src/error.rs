//! Error types for fluentq

use crate::connection::DriverFamily;
use crate::value::ValueKind;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for fluentq operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query building and execution.
///
/// The enum is `Clone` so builders can record an eager validation failure and
/// surface it later from `build()`; driver errors are held behind `Arc`.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Builder misconfiguration (no table bound, no values/assignments supplied)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A referenced column does not exist on the bound table
    #[error("Column {column} not in table {table}")]
    UnknownColumn { column: String, table: String },

    /// A bound value's kind is not accepted by the target column
    #[error("Type mismatch on column {column}: expected one of {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: Vec<ValueKind>,
        actual: ValueKind,
    },

    /// Sync execution requested on an async driver, or vice versa
    #[error("Connection mode mismatch for {family} connection: {hint}")]
    ConnectionMode {
        family: DriverFamily,
        hint: &'static str,
    },

    /// PostgreSQL driver error (sync, async, and pooled families)
    #[error("Postgres error: {0}")]
    Postgres(Arc<tokio_postgres::Error>),

    /// MySQL driver error (sync family)
    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    Mysql(Arc<mysql::Error>),

    /// MySQL driver error (async family)
    #[cfg(feature = "mysql-async")]
    #[error("MySQL error: {0}")]
    MysqlAsync(Arc<mysql_async::Error>),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl QueryError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an unknown-column error for a specific table
    pub fn unknown_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an unknown-column error
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, Self::UnknownColumn { .. })
    }

    /// Check if this is a type-mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if this is a connection-mode-mismatch error
    pub fn is_connection_mode(&self) -> bool {
        matches!(self, Self::ConnectionMode { .. })
    }
}

impl From<tokio_postgres::Error> for QueryError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Postgres(Arc::new(err))
    }
}

#[cfg(feature = "mysql")]
impl From<mysql::Error> for QueryError {
    fn from(err: mysql::Error) -> Self {
        Self::Mysql(Arc::new(err))
    }
}

#[cfg(feature = "mysql-async")]
impl From<mysql_async::Error> for QueryError {
    fn from(err: mysql_async::Error) -> Self {
        Self::MysqlAsync(Arc::new(err))
    }
}
