// src/internal/dispatcher/coerce.rs

use serde_json::{Number, Value};

use crate::internal::parser::types::{ParamType, ScalarType};

impl ScalarType {
    /// Coerce a caller value to this type. `None` means the value is not
    /// acceptable.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            ScalarType::String => coerce_string(value),
            ScalarType::Integer => coerce_integer(value),
            ScalarType::Number => coerce_number(value),
            ScalarType::Boolean => coerce_boolean(value),
        }
    }
}

impl ParamType {
    /// Scalars are coerced; composites pass through untouched.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            ParamType::Scalar(scalar) => scalar.coerce(value),
            ParamType::Array | ParamType::Object => Some(value.clone()),
        }
    }
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n.as_f64().and_then(integral_f64),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn integral_f64(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Value::from(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Text form of a single value as it appears in a URL.
///
/// Strings are used verbatim; composites are sent as compact JSON.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Query string values for one parameter; arrays repeat the key.
pub fn render_query_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(render_scalar)
            .collect(),
        other => vec![render_scalar(other)],
    }
}
