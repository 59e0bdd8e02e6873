//! Shape checks for API response bodies.
//!
//! Each endpoint's body is checked structurally before it is deserialized,
//! so a server returning something unexpected yields a precise
//! [`ShapeError`] instead of a half-populated value.

use farmacia_core::{Page, Pharmacy};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ShapeError(pub String);

/// Option-list endpoints: a JSON array of strings.
///
/// # Errors
///
/// Returns [`ShapeError`] if the body is not an array or any element is not a
/// string.
pub fn string_list(body: Value) -> Result<Vec<String>, ShapeError> {
    let Value::Array(items) = body else {
        return Err(ShapeError(format!("expected array, got {}", kind(&body))));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(ShapeError(format!(
                "expected string at index {i}, got {}",
                kind(&other)
            ))),
        })
        .collect()
}

/// Lookup endpoint: `{ "data": [Pharmacy] }`.
///
/// # Errors
///
/// Returns [`ShapeError`] if `data` is missing, not an array, or contains
/// an element that is not a pharmacy record.
pub fn pharmacy_list(body: Value) -> Result<Vec<Pharmacy>, ShapeError> {
    let data = take_field(body, "data")?;
    records(data)
}

/// Listing endpoint: `{ "data": [Pharmacy], "pagination": {..} }`.
///
/// # Errors
///
/// Returns [`ShapeError`] if either field is missing or malformed.
pub fn pharmacy_page(body: Value) -> Result<Page<Pharmacy>, ShapeError> {
    let Value::Object(mut map) = body else {
        return Err(ShapeError(format!("expected object, got {}", kind(&body))));
    };
    let data = map
        .remove("data")
        .ok_or_else(|| ShapeError("missing field 'data'".to_string()))?;
    let pagination = map
        .remove("pagination")
        .ok_or_else(|| ShapeError("missing field 'pagination'".to_string()))?;
    if !pagination.is_object() {
        return Err(ShapeError(format!(
            "expected 'pagination' object, got {}",
            kind(&pagination)
        )));
    }

    Ok(Page {
        data: records(data)?,
        pagination: serde_json::from_value(pagination)
            .map_err(|e| ShapeError(format!("invalid 'pagination': {e}")))?,
    })
}

fn take_field(body: Value, field: &str) -> Result<Value, ShapeError> {
    match body {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| ShapeError(format!("missing field '{field}'"))),
        other => Err(ShapeError(format!("expected object, got {}", kind(&other)))),
    }
}

fn records(data: Value) -> Result<Vec<Pharmacy>, ShapeError> {
    let Value::Array(items) = data else {
        return Err(ShapeError(format!(
            "expected 'data' array, got {}",
            kind(&data)
        )));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| ShapeError(format!("invalid record at index {i}: {e}")))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
