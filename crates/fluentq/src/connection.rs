//! Connection adapter normalizing heterogeneous database drivers.
//!
//! [`ConnectionAdapter`] wraps exactly one externally opened driver handle.
//! The driver family is a closed enum determined once at construction from
//! the handle's type (via the `From` impls below) and immutable afterwards.
//! Every family is either synchronous or asynchronous; calling the wrong
//! execution mode fails fast with a descriptive error before any I/O.

use crate::condition::Placeholder;
use crate::error::{QueryError, QueryResult};
use crate::row::Row;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::{ToSql, Type};

/// The classification bucket assigned to a connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverFamily {
    /// `postgres::Client` (blocking)
    PostgresSync,
    /// `tokio_postgres::Client`
    PostgresAsync,
    /// `deadpool_postgres::Client`, an already-checked-out pooled connection
    #[cfg(feature = "pool")]
    PostgresPool,
    /// `mysql::Conn` (blocking)
    #[cfg(feature = "mysql")]
    MysqlSync,
    /// `mysql_async::Conn`
    #[cfg(feature = "mysql-async")]
    MysqlAsync,
}

impl DriverFamily {
    /// Whether this family only supports the asynchronous execution path.
    pub fn is_async(self) -> bool {
        match self {
            DriverFamily::PostgresSync => false,
            DriverFamily::PostgresAsync => true,
            #[cfg(feature = "pool")]
            DriverFamily::PostgresPool => true,
            #[cfg(feature = "mysql")]
            DriverFamily::MysqlSync => false,
            #[cfg(feature = "mysql-async")]
            DriverFamily::MysqlAsync => true,
        }
    }

    /// The positional placeholder syntax this family's driver expects.
    pub fn placeholder(self) -> Placeholder {
        match self {
            DriverFamily::PostgresSync | DriverFamily::PostgresAsync => Placeholder::Numbered,
            #[cfg(feature = "pool")]
            DriverFamily::PostgresPool => Placeholder::Numbered,
            #[cfg(feature = "mysql")]
            DriverFamily::MysqlSync => Placeholder::Question,
            #[cfg(feature = "mysql-async")]
            DriverFamily::MysqlAsync => Placeholder::Question,
        }
    }
}

impl fmt::Display for DriverFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverFamily::PostgresSync => "postgres (sync)",
            DriverFamily::PostgresAsync => "postgres (async)",
            #[cfg(feature = "pool")]
            DriverFamily::PostgresPool => "postgres (pooled)",
            #[cfg(feature = "mysql")]
            DriverFamily::MysqlSync => "mysql (sync)",
            #[cfg(feature = "mysql-async")]
            DriverFamily::MysqlAsync => "mysql (async)",
        };
        f.write_str(name)
    }
}

const ASYNC_ONLY_HINT: &str = "the driver is asynchronous; use fetch_async()/execute_async()";
const SYNC_ONLY_HINT: &str = "the driver is synchronous; use fetch()/execute()";

enum Handle {
    PostgresSync(postgres::Client),
    PostgresAsync(tokio_postgres::Client),
    #[cfg(feature = "pool")]
    PostgresPool(deadpool_postgres::Client),
    #[cfg(feature = "mysql")]
    MysqlSync(mysql::Conn),
    #[cfg(feature = "mysql-async")]
    MysqlAsync(mysql_async::Conn),
}

/// Wraps one opened connection behind a uniform execution contract.
///
/// The adapter does not pool, retry, or manage the connection lifecycle; it
/// runs one statement per call and surfaces driver errors verbatim.
pub struct ConnectionAdapter {
    handle: Handle,
    family: DriverFamily,
    alias: String,
}

impl ConnectionAdapter {
    fn new(handle: Handle, family: DriverFamily) -> Self {
        Self {
            handle,
            family,
            alias: "default".to_string(),
        }
    }

    /// Set the database alias reported by [`ConnectionAdapter::db_alias`].
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn family(&self) -> DriverFamily {
        self.family
    }

    pub fn is_async(&self) -> bool {
        self.family.is_async()
    }

    /// Database alias used for model materialization. Defaults to `default`.
    pub fn db_alias(&self) -> &str {
        &self.alias
    }

    pub(crate) fn placeholder(&self) -> Placeholder {
        self.family.placeholder()
    }

    /// Run a row-returning statement on a synchronous driver.
    pub(crate) fn query_sync(&mut self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        let family = self.family;
        tracing::debug!(statement = sql, params = params.len(), "executing statement");
        match &mut self.handle {
            Handle::PostgresSync(client) => {
                let refs = pg_param_refs(params);
                let rows = client.query(sql, &refs)?;
                decode_pg_rows(rows)
            }
            #[cfg(feature = "mysql")]
            Handle::MysqlSync(conn) => {
                use mysql::prelude::Queryable;
                let rows: Vec<mysql::Row> = conn.exec(sql, mysql_params(params))?;
                decode_mysql_rows(rows)
            }
            _ => Err(QueryError::ConnectionMode {
                family,
                hint: ASYNC_ONLY_HINT,
            }),
        }
    }

    /// Run a statement on a synchronous driver, returning the affected count.
    pub(crate) fn execute_sync(&mut self, sql: &str, params: &[Value]) -> QueryResult<u64> {
        let family = self.family;
        tracing::debug!(statement = sql, params = params.len(), "executing statement");
        match &mut self.handle {
            Handle::PostgresSync(client) => {
                let refs = pg_param_refs(params);
                Ok(client.execute(sql, &refs)?)
            }
            #[cfg(feature = "mysql")]
            Handle::MysqlSync(conn) => {
                use mysql::prelude::Queryable;
                conn.exec_drop(sql, mysql_params(params))?;
                Ok(conn.affected_rows())
            }
            _ => Err(QueryError::ConnectionMode {
                family,
                hint: ASYNC_ONLY_HINT,
            }),
        }
    }

    /// Run a row-returning statement on an asynchronous driver.
    pub(crate) async fn query_async(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> QueryResult<Vec<Row>> {
        let family = self.family;
        tracing::debug!(statement = sql, params = params.len(), "executing statement");
        match &mut self.handle {
            Handle::PostgresAsync(client) => {
                let refs = pg_param_refs(params);
                let rows = client.query(sql, &refs).await?;
                decode_pg_rows(rows)
            }
            #[cfg(feature = "pool")]
            Handle::PostgresPool(client) => {
                let refs = pg_param_refs(params);
                let rows = client.query(sql, &refs).await?;
                decode_pg_rows(rows)
            }
            #[cfg(feature = "mysql-async")]
            Handle::MysqlAsync(conn) => {
                use mysql_async::prelude::Queryable;
                let rows: Vec<mysql_async::Row> = conn.exec(sql, mysql_async_params(params)).await?;
                decode_mysql_async_rows(rows)
            }
            _ => Err(QueryError::ConnectionMode {
                family,
                hint: SYNC_ONLY_HINT,
            }),
        }
    }

    /// Run a statement on an asynchronous driver, returning the affected count.
    pub(crate) async fn execute_async(&mut self, sql: &str, params: &[Value]) -> QueryResult<u64> {
        let family = self.family;
        tracing::debug!(statement = sql, params = params.len(), "executing statement");
        match &mut self.handle {
            Handle::PostgresAsync(client) => {
                let refs = pg_param_refs(params);
                Ok(client.execute(sql, &refs).await?)
            }
            #[cfg(feature = "pool")]
            Handle::PostgresPool(client) => {
                let refs = pg_param_refs(params);
                Ok(client.execute(sql, &refs).await?)
            }
            #[cfg(feature = "mysql-async")]
            Handle::MysqlAsync(conn) => {
                use mysql_async::prelude::Queryable;
                conn.exec_drop(sql, mysql_async_params(params)).await?;
                Ok(conn.affected_rows())
            }
            _ => Err(QueryError::ConnectionMode {
                family,
                hint: SYNC_ONLY_HINT,
            }),
        }
    }
}

impl From<postgres::Client> for ConnectionAdapter {
    fn from(client: postgres::Client) -> Self {
        Self::new(Handle::PostgresSync(client), DriverFamily::PostgresSync)
    }
}

impl From<tokio_postgres::Client> for ConnectionAdapter {
    fn from(client: tokio_postgres::Client) -> Self {
        Self::new(Handle::PostgresAsync(client), DriverFamily::PostgresAsync)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::Client> for ConnectionAdapter {
    fn from(client: deadpool_postgres::Client) -> Self {
        Self::new(Handle::PostgresPool(client), DriverFamily::PostgresPool)
    }
}

#[cfg(feature = "mysql")]
impl From<mysql::Conn> for ConnectionAdapter {
    fn from(conn: mysql::Conn) -> Self {
        Self::new(Handle::MysqlSync(conn), DriverFamily::MysqlSync)
    }
}

#[cfg(feature = "mysql-async")]
impl From<mysql_async::Conn> for ConnectionAdapter {
    fn from(conn: mysql_async::Conn) -> Self {
        Self::new(Handle::MysqlAsync(conn), DriverFamily::MysqlAsync)
    }
}

fn pg_param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn decode_pg_rows(rows: Vec<tokio_postgres::Row>) -> QueryResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(decode_pg_value(row, idx)?);
        }
        out.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

fn decode_pg_value(row: &tokio_postgres::Row, idx: usize) -> QueryResult<Value> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?
            .map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?
            .map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Real(v.into()))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Real)
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
    {
        row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<serde_json::Value>>(idx)?
            .map(Value::Json)
    } else if *ty == Type::UUID {
        row.try_get::<_, Option<uuid::Uuid>>(idx)?.map(Value::Uuid)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
            .map(|v| Value::Text(v.to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(|v| Value::Text(v.to_rfc3339()))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(idx)?
            .map(|v| Value::Text(v.to_string()))
    } else if *ty == Type::TIME {
        row.try_get::<_, Option<chrono::NaiveTime>>(idx)?
            .map(|v| Value::Text(v.to_string()))
    } else {
        return Err(QueryError::decode(
            column.name(),
            format!("unsupported column type {ty}"),
        ));
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(feature = "mysql")]
fn mysql_params(params: &[Value]) -> mysql::Params {
    if params.is_empty() {
        mysql::Params::Empty
    } else {
        mysql::Params::Positional(params.iter().map(mysql::Value::from).collect())
    }
}

#[cfg(feature = "mysql-async")]
fn mysql_async_params(params: &[Value]) -> mysql_async::Params {
    if params.is_empty() {
        mysql_async::Params::Empty
    } else {
        mysql_async::Params::Positional(params.iter().map(mysql_async::Value::from).collect())
    }
}

#[cfg(any(feature = "mysql", feature = "mysql-async"))]
fn format_mysql_datetime(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8, us: u32) -> String {
    if us == 0 {
        format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}")
    } else {
        format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}.{us:06}")
    }
}

#[cfg(any(feature = "mysql", feature = "mysql-async"))]
fn format_mysql_time(negative: bool, days: u32, h: u8, mi: u8, s: u8, us: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let hours = u64::from(days) * 24 + u64::from(h);
    if us == 0 {
        format!("{sign}{hours:02}:{mi:02}:{s:02}")
    } else {
        format!("{sign}{hours:02}:{mi:02}:{s:02}.{us:06}")
    }
}

// The two MySQL drivers ship structurally identical value/row types from
// different crate versions, so the decoders are stamped out per driver.
#[cfg(any(feature = "mysql", feature = "mysql-async"))]
macro_rules! mysql_decoders {
    ($decode_rows:ident, $decode_value:ident, $krate:ident) => {
        fn $decode_rows(rows: Vec<$krate::Row>) -> QueryResult<Vec<Row>> {
            let Some(first) = rows.first() else {
                return Ok(Vec::new());
            };
            let columns: Arc<[String]> = first
                .columns_ref()
                .iter()
                .map(|c| c.name_str().to_string())
                .collect();
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let raw = row.unwrap();
                let mut values = Vec::with_capacity(raw.len());
                for (idx, value) in raw.into_iter().enumerate() {
                    values.push($decode_value(value, &columns[idx])?);
                }
                out.push(Row::new(Arc::clone(&columns), values));
            }
            Ok(out)
        }

        fn $decode_value(value: $krate::Value, column: &str) -> QueryResult<Value> {
            Ok(match value {
                $krate::Value::NULL => Value::Null,
                $krate::Value::Bytes(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => Value::Text(text),
                    Err(err) => Value::Bytes(err.into_bytes()),
                },
                $krate::Value::Int(v) => Value::Int(v),
                $krate::Value::UInt(v) => Value::Int(i64::try_from(v).map_err(|_| {
                    QueryError::decode(column, "unsigned value out of i64 range")
                })?),
                $krate::Value::Float(v) => Value::Real(v.into()),
                $krate::Value::Double(v) => Value::Real(v),
                $krate::Value::Date(y, mo, d, h, mi, s, us) => {
                    Value::Text(format_mysql_datetime(y, mo, d, h, mi, s, us))
                }
                $krate::Value::Time(neg, days, h, mi, s, us) => {
                    Value::Text(format_mysql_time(neg, days, h, mi, s, us))
                }
            })
        }
    };
}

#[cfg(feature = "mysql")]
mysql_decoders!(decode_mysql_rows, decode_mysql_value, mysql);

#[cfg(feature = "mysql-async")]
mysql_decoders!(decode_mysql_async_rows, decode_mysql_async_value, mysql_async);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_modes() {
        assert!(!DriverFamily::PostgresSync.is_async());
        assert!(DriverFamily::PostgresAsync.is_async());
        #[cfg(feature = "pool")]
        assert!(DriverFamily::PostgresPool.is_async());
        #[cfg(feature = "mysql")]
        assert!(!DriverFamily::MysqlSync.is_async());
        #[cfg(feature = "mysql-async")]
        assert!(DriverFamily::MysqlAsync.is_async());
    }

    #[test]
    fn family_placeholders() {
        assert_eq!(
            DriverFamily::PostgresSync.placeholder(),
            Placeholder::Numbered
        );
        #[cfg(feature = "mysql")]
        assert_eq!(DriverFamily::MysqlSync.placeholder(), Placeholder::Question);
    }

    #[test]
    fn mode_mismatch_message_names_family() {
        let err = QueryError::ConnectionMode {
            family: DriverFamily::PostgresAsync,
            hint: ASYNC_ONLY_HINT,
        };
        let message = err.to_string();
        assert!(message.contains("postgres (async)"));
        assert!(message.contains("fetch_async"));
    }

    #[cfg(feature = "mysql")]
    #[test]
    fn mysql_temporal_formatting() {
        assert_eq!(
            format_mysql_datetime(2024, 3, 9, 14, 5, 2, 0),
            "2024-03-09 14:05:02"
        );
        assert_eq!(
            format_mysql_datetime(2024, 3, 9, 14, 5, 2, 120),
            "2024-03-09 14:05:02.000120"
        );
        assert_eq!(format_mysql_time(true, 1, 2, 3, 4, 0), "-26:03:04");
    }
}
