//! Helpers over the generic JSON value model.
//!
//! Values are `serde_json::Value`. This module classifies them into the seven
//! kinds the validators reason about and provides the one deep equality used
//! for literal matching.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// The seven kinds a JSON value can have.
///
/// `Integer` and `Float` are distinguished even though both are carried by
/// `serde_json::Number`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Object,
    Array,
    String,
    Integer,
    Float,
    Boolean,
    Null,
}

impl Kind {
    /// Classifies a value.
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
            Value::String(_) => Kind::String,
            Value::Number(n) if is_integer(n) => Kind::Integer,
            Value::Number(_) => Kind::Float,
            Value::Bool(_) => Kind::Boolean,
            Value::Null => Kind::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

/// Deep structural equality over the seven kinds.
///
/// Both sides must have the same kind. Integers never equal floats, even when
/// numerically identical. Object member order is irrelevant.
pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (is_integer(a), is_integer(b)) {
            (true, true) => a.as_i64() == b.as_i64() && a.as_u64() == b.as_u64(),
            (false, false) => a.as_f64() == b.as_f64(),
            _ => false,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| structurally_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, val_a)| {
                    b.get(key)
                        .is_some_and(|val_b| structurally_equal(val_a, val_b))
                })
        }
        _ => false,
    }
}

/// Compact JSON text of a value. Strings are quoted.
pub fn render(value: &Value) -> String {
    value.to_string()
}

/// Short description used when a value is reported against alternatives:
/// scalars are rendered, containers are named by kind.
pub fn describe_shallow(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => Kind::of(value).to_string(),
        scalar => render(scalar),
    }
}

/// Whether a value is a scalar (anything but an array or object).
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
