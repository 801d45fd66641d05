//! Lenient coercion of client-supplied values
//!
//! Report and rating payloads come from web forms: numbers arrive as strings,
//! blanks arrive as empty strings. Numeric fields never reject input; they
//! fall back to 0. Text fields treat blank as absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value to a finite number, 0 when not numeric
pub fn number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(true) => Some(1.0),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Coerce a JSON value to a whole count, rounding fractions
pub fn count(value: &Value) -> i64 {
    let n = number(value).round();
    if n >= i64::MAX as f64 {
        i64::MAX
    } else if n <= i64::MIN as f64 {
        i64::MIN
    } else {
        n as i64
    }
}

/// Text from a string or number; blank and non-scalar values are `None`
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive id from a number or numeric string
pub fn id(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    n.filter(|id| *id > 0)
}

/// `deserialize_with` adapter for [`text`]
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value))
}

/// `deserialize_with` adapter for [`id`]
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id(&value))
}
