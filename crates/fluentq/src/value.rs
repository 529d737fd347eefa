//! Scalar parameter values and their kinds.
//!
//! [`Value`] is the closed set of scalar kinds a query can bind or a result
//! row can carry. Every parameter travels out-of-band as a `Value`, never
//! interpolated into SQL text. [`ValueKind`] is the tag used by per-column
//! accepted-kind validation.

use bytes::BytesMut;
use serde::Serialize;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar value bound to a query parameter or read from a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Structured JSON value (rendered as json/jsonb on PostgreSQL)
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
}

/// The kind tag of a [`Value`], used for accepted-kind validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Real,
    Text,
    Bytes,
    Json,
    Uuid,
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Real(_) => ValueKind::Real,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Json(_) => ValueKind::Json,
            Value::Uuid(_) => ValueKind::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

// Bridge into the PostgreSQL wire encoding. The target column type is only
// known at bind time, so integer and real values adapt to the narrower
// widths (int2/int4/float4) with checked conversions.
impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Real(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    // accepts() is unconditionally true, so the checked path is the plain one.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        self.to_sql(ty, out)
    }
}

#[cfg(feature = "mysql")]
impl From<&Value> for mysql::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => mysql::Value::NULL,
            Value::Bool(b) => mysql::Value::Int(i64::from(*b)),
            Value::Int(i) => mysql::Value::Int(*i),
            Value::Real(f) => mysql::Value::Double(*f),
            Value::Text(s) => mysql::Value::Bytes(s.clone().into_bytes()),
            Value::Bytes(b) => mysql::Value::Bytes(b.clone()),
            Value::Json(j) => mysql::Value::Bytes(j.to_string().into_bytes()),
            Value::Uuid(u) => mysql::Value::Bytes(u.to_string().into_bytes()),
        }
    }
}

// `mysql` and `mysql-async` re-export the same `mysql_common::Value`, so when
// both features are enabled this impl would collide with the one above; gate it
// to the async-only case. The target type is identical either way, so callers
// using `mysql_async::Value::from` resolve to whichever impl is present.
#[cfg(all(feature = "mysql-async", not(feature = "mysql")))]
impl From<&Value> for mysql_async::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => mysql_async::Value::NULL,
            Value::Bool(b) => mysql_async::Value::Int(i64::from(*b)),
            Value::Int(i) => mysql_async::Value::Int(*i),
            Value::Real(f) => mysql_async::Value::Double(*f),
            Value::Text(s) => mysql_async::Value::Bytes(s.clone().into_bytes()),
            Value::Bytes(b) => mysql_async::Value::Bytes(b.clone()),
            Value::Json(j) => mysql_async::Value::Bytes(j.to_string().into_bytes()),
            Value::Uuid(u) => mysql_async::Value::Bytes(u.to_string().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(42i64).kind(), ValueKind::Int);
        assert_eq!(Value::from(1.5f64).kind(), ValueKind::Real);
        assert_eq!(Value::from("hi").kind(), ValueKind::Text);
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(vec![1u8, 2]).kind(), ValueKind::Bytes);
        assert_eq!(
            Value::from(serde_json::json!({"a": 1})).kind(),
            ValueKind::Json
        );
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Text("x".into()).as_i64(), None);
        assert!(Value::Null.is_null());
    }

    #[cfg(feature = "mysql")]
    #[test]
    fn mysql_bridge() {
        assert_eq!(mysql::Value::from(&Value::Null), mysql::Value::NULL);
        assert_eq!(mysql::Value::from(&Value::Int(5)), mysql::Value::Int(5));
        assert_eq!(
            mysql::Value::from(&Value::Text("ab".into())),
            mysql::Value::Bytes(b"ab".to_vec())
        );
        assert_eq!(mysql::Value::from(&Value::Bool(true)), mysql::Value::Int(1));
    }
}
