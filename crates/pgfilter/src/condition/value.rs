//! Typed filter operands.

use crate::error::TermError;
use crate::qb::Param;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column type a [`Field`](super::Field) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// `text` / `varchar`
    Text,
    /// `integer`
    Int,
    /// `bigint` / `bigserial`
    BigInt,
}

/// A filter operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Int(i32),
    BigInt(i64),
}

impl Value {
    /// The column type this value naturally binds to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Text(_) => FieldKind::Text,
            Value::Int(_) => FieldKind::Int,
            Value::BigInt(_) => FieldKind::BigInt,
        }
    }

    /// Convert the value to `kind`, widening or narrowing integers.
    ///
    /// `field` is only used to describe the failure.
    pub fn coerce_to(self, kind: FieldKind, field: &str) -> Result<Value, TermError> {
        match (self, kind) {
            (v @ Value::Text(_), FieldKind::Text)
            | (v @ Value::Int(_), FieldKind::Int)
            | (v @ Value::BigInt(_), FieldKind::BigInt) => Ok(v),
            (Value::Int(i), FieldKind::BigInt) => Ok(Value::BigInt(i64::from(i))),
            (Value::BigInt(i), FieldKind::Int) => {
                i32::try_from(i)
                    .map(Value::Int)
                    .map_err(|_| TermError::OutOfRange {
                        field: field.to_string(),
                        expected: kind,
                        value: i,
                    })
            }
            (v, expected) => Err(TermError::TypeMismatch {
                field: field.to_string(),
                expected,
                found: v.kind(),
            }),
        }
    }

    /// Compare two values the way PostgreSQL would for the same column type.
    ///
    /// Returns `None` when the values are not comparable (text vs number).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (a, b) => Some(a.as_i64()?.cmp(&b.as_i64()?)),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::BigInt(i) => Some(*i),
            Value::Text(_) => None,
        }
    }

    pub(crate) fn to_param(&self) -> Param {
        match self {
            Value::Text(s) => Param::new(s.clone()),
            Value::Int(i) => Param::new(*i),
            Value::BigInt(i) => Param::new(*i),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(value)
    }
}
