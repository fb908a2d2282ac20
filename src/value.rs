//! Plain literal values used on the right-hand side of conditions.

use serde::{Deserialize, Serialize};

use crate::error::{DslError, DslResult};
use crate::schema::ColumnType;
use crate::sql::expr::{lit_bool, lit_float, lit_int, lit_null, lit_str, Expr};

/// A plain value a condition can compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Cast this value to the type of the column it is compared with.
    ///
    /// Values that have no sensible representation in the column type are
    /// returned unchanged.
    pub fn cast(self, column_type: ColumnType) -> Value {
        match (column_type, self) {
            (_, Value::Null) => Value::Null,
            (ColumnType::Integer, Value::Float(f)) if f.fract() == 0.0 => Value::Int(f as i64),
            (ColumnType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::String(s),
            },
            (ColumnType::Float, Value::Int(n)) => Value::Float(n as f64),
            (ColumnType::Float, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Value::Float(f),
                _ => Value::String(s),
            },
            (ColumnType::String | ColumnType::Text, Value::Int(n)) => Value::String(n.to_string()),
            (ColumnType::String | ColumnType::Text, Value::Float(f)) => {
                let mut buffer = ryu::Buffer::new();
                Value::String(buffer.format(f).to_string())
            }
            (ColumnType::Boolean, Value::Int(0)) => Value::Bool(false),
            (ColumnType::Boolean, Value::Int(1)) => Value::Bool(true),
            (_, value) => value,
        }
    }

    /// Literal expression for this value. Floats must be finite.
    pub(crate) fn to_expr(&self) -> DslResult<Expr> {
        Ok(match self {
            Value::Null => lit_null(),
            Value::Bool(b) => lit_bool(*b),
            Value::Int(n) => lit_int(*n),
            Value::Float(f) if f.is_finite() => lit_float(*f),
            Value::Float(f) => {
                return Err(DslError::InvalidValue(format!(
                    "{} has no SQL literal",
                    f
                )))
            }
            Value::String(s) => lit_str(s),
        })
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
