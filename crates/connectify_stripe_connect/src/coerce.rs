//! Coercion of loosely typed form and JSON input.

use crate::error::StripeError;
use serde_json::Value;

/// Parses a boolean-like string.
///
/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`/empty, trimmed and
/// case-insensitive. Everything else is `None`.
pub fn parse_truthy(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// [`parse_truthy`] over a JSON value. Booleans map directly, numbers only as `1`/`0`.
pub fn truthy_value(field: &str, value: &Value) -> Result<bool, StripeError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => parse_truthy(s),
        _ => None,
    };
    parsed.ok_or_else(|| StripeError::invalid_input(field, format!("{} is not a boolean", value)))
}

/// An integer id given as a number or a numeric string. `None` for null or blank.
pub fn optional_id(field: &str, value: &Value) -> Result<Option<i64>, StripeError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| StripeError::invalid_input(field, format!("{} is not an id", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| StripeError::invalid_input(field, format!("'{}' is not an id", s))),
        other => Err(StripeError::invalid_input(
            field,
            format!("{} is not an id", other),
        )),
    }
}

/// A number given as JSON number or numeric string.
pub fn number(field: &str, value: &Value) -> Result<f64, StripeError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| StripeError::invalid_input(field, format!("{} is not a number", n))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StripeError::invalid_input(field, format!("'{}' is not a number", s))),
        other => Err(StripeError::invalid_input(
            field,
            format!("{} is not a number", other),
        )),
    }
}

/// A list of product ids: a JSON array of strings/numbers, or that array encoded as text.
pub fn string_list(field: &str, value: &Value) -> Result<Vec<String>, StripeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(StripeError::invalid_input(
                    field,
                    format!("{} is not a product id", other),
                )),
            })
            .collect(),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => {
            let decoded: Value = serde_json::from_str(s).map_err(|_| {
                StripeError::invalid_input(field, format!("'{}' is not a list", s))
            })?;
            match decoded {
                Value::Array(_) => string_list(field, &decoded),
                _ => Err(StripeError::invalid_input(
                    field,
                    format!("'{}' is not a list", s),
                )),
            }
        }
        other => Err(StripeError::invalid_input(
            field,
            format!("{} is not a list", other),
        )),
    }
}
