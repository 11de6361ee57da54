// crates/backcheck-core/src/verify.rs
// ============================================================================
// Module: Response Checks
// Description: Composable checks applied to dispatched responses.
// Purpose: Status, partial-body, structural-schema, and snapshot comparison.
// Dependencies: regex, serde, serde_json
// ============================================================================

//! ## Overview
//! A small composable set of checks chained onto a dispatched response.
//! Check failures are the primary failure mode of the whole suite, so every
//! mismatch names the offending field and carries expected-vs-actual detail;
//! a failed run must be diagnosable without a re-run.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::dispatch::ApiResponse;
use crate::error::BackcheckError;

/// ISO 8601 date-time matcher for the `date-time` format check.
static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z?$").expect("date-time pattern")
});

/// Canonical UUID matcher for the `uuid` format check.
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern")
});

/// Structural schema for [`verify_schema`].
///
/// A deliberately light subset of JSON Schema: type names, required fields,
/// nested properties, and two format checks. `["type", "null"]` arrays mark
/// nullable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    /// Expected type name, or a list including `"null"` for nullable fields.
    #[serde(rename = "type", default)]
    pub kind: Option<SchemaType>,
    /// Fields that must be present.
    #[serde(default)]
    pub required: Vec<String>,
    /// Per-property schemas, checked when the property is present.
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,
    /// Optional format check: `date-time` or `uuid`.
    #[serde(default)]
    pub format: Option<String>,
}

/// One type name or a nullable list of type names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// A single type name.
    One(String),
    /// Several type names, typically `["string", "null"]`.
    Many(Vec<String>),
}

/// Checks the response status against an exact expected code.
///
/// # Errors
///
/// Returns [`BackcheckError::StatusMismatch`] carrying the body's `detail`,
/// `errors`, or `title` field so the failure is readable without the raw
/// payload.
pub fn verify_status(response: &ApiResponse, expected: u16) -> Result<(), BackcheckError> {
    if response.status == expected {
        return Ok(());
    }
    Err(BackcheckError::StatusMismatch {
        expected,
        actual: response.status,
        detail: error_detail(&response.body),
    })
}

/// Checks the response body against expected values with partial-match
/// semantics.
///
/// For an object expectation, each top-level key must be present and
/// deep-equal; keys absent from the expectation are not checked. An empty
/// object passes for any body. A primitive expectation compares directly.
///
/// # Errors
///
/// Returns [`BackcheckError::BodyMismatch`] naming the offending key.
pub fn validate_body(response: &ApiResponse, expected: &Value) -> Result<(), BackcheckError> {
    match expected {
        Value::Object(map) if map.is_empty() => Ok(()),
        Value::Object(map) => {
            let Value::Object(actual) = &response.body else {
                return Err(BackcheckError::BodyMismatch {
                    key: "$".to_string(),
                    detail: format!("expected an object body, got {}", type_name(&response.body)),
                });
            };
            for (key, value) in map {
                let Some(actual_value) = actual.get(key) else {
                    return Err(BackcheckError::BodyMismatch {
                        key: key.clone(),
                        detail: "key is missing from the response body".to_string(),
                    });
                };
                if actual_value != value {
                    return Err(BackcheckError::BodyMismatch {
                        key: key.clone(),
                        detail: format!("expected {value}, got {actual_value}"),
                    });
                }
            }
            Ok(())
        }
        other => {
            if &response.body == other {
                Ok(())
            } else {
                Err(BackcheckError::BodyMismatch {
                    key: "$".to_string(),
                    detail: format!("expected {other}, got {}", response.body),
                })
            }
        }
    }
}

/// Validates the response body against a structural schema.
///
/// A missing schema is a logged no-op so fixture steps without one pass
/// trivially.
///
/// # Errors
///
/// Returns [`BackcheckError::SchemaMismatch`] naming the dotted path of the
/// first violating field.
pub fn verify_schema(
    response: &ApiResponse,
    schema: Option<&Schema>,
) -> Result<(), BackcheckError> {
    let Some(schema) = schema else {
        log::info!("no response schema supplied, skipping validation");
        return Ok(());
    };
    if response.body.is_null() {
        return Err(BackcheckError::SchemaMismatch {
            field: "$".to_string(),
            detail: "response body is null".to_string(),
        });
    }
    validate_value(&response.body, schema, "$")
}

/// Compares two values for deep equality after dropping ignored top-level
/// keys from both sides.
///
/// Used when comparing live data against semi-stable fixture snapshots whose
/// volatile fields (balances, timestamps) legitimately drift.
///
/// # Errors
///
/// Returns [`BackcheckError::BodyMismatch`] naming the first differing key.
pub fn assert_deep_equal_ignoring(
    actual: &Value,
    expected: &Value,
    ignored: &[&str],
) -> Result<(), BackcheckError> {
    let stripped_actual = strip_keys(actual, ignored);
    let stripped_expected = strip_keys(expected, ignored);
    if stripped_actual == stripped_expected {
        return Ok(());
    }
    Err(BackcheckError::BodyMismatch {
        key: first_difference(&stripped_actual, &stripped_expected),
        detail: format!("expected {stripped_expected}, got {stripped_actual}"),
    })
}

/// Extracts the most useful error text from an error body.
fn error_detail(body: &Value) -> String {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }
    if let Some(errors) = body.get("errors") {
        return errors.to_string();
    }
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        return title.to_string();
    }
    if body.is_null() { "<empty body>".to_string() } else { body.to_string() }
}

/// Recursively validates one value against its schema.
fn validate_value(value: &Value, schema: &Schema, path: &str) -> Result<(), BackcheckError> {
    if let Some(kind) = &schema.kind {
        match effective_type(kind, value) {
            TypeOutcome::NullAllowed => return Ok(()),
            TypeOutcome::Check(name) => check_type(value, &name, path)?,
            TypeOutcome::None => {}
        }
    }
    if let Value::Object(map) = value {
        for field in &schema.required {
            if !map.contains_key(field) {
                return Err(BackcheckError::SchemaMismatch {
                    field: join_path(path, field),
                    detail: "required field is missing".to_string(),
                });
            }
        }
        for (name, property) in &schema.properties {
            if let Some(nested) = map.get(name) {
                validate_value(nested, property, &join_path(path, name))?;
            }
        }
    }
    if let (Some(format), Value::String(text)) = (&schema.format, value) {
        check_format(text, format, path)?;
    }
    Ok(())
}

/// Result of resolving a nullable type list against a value.
enum TypeOutcome {
    /// Value is null and the schema allows null.
    NullAllowed,
    /// Check the value against this single type name.
    Check(String),
    /// No single type to check against.
    None,
}

/// Resolves `["type", "null"]` lists into a single checkable type.
fn effective_type(kind: &SchemaType, value: &Value) -> TypeOutcome {
    match kind {
        SchemaType::One(name) => TypeOutcome::Check(name.clone()),
        SchemaType::Many(names) => {
            if names.iter().any(|name| name == "null") && value.is_null() {
                return TypeOutcome::NullAllowed;
            }
            let non_null: Vec<&String> = names.iter().filter(|name| *name != "null").collect();
            match non_null.as_slice() {
                [single] => TypeOutcome::Check((*single).clone()),
                _ => TypeOutcome::None,
            }
        }
    }
}

/// Checks a value against one JSON type name.
fn check_type(value: &Value, expected: &str, path: &str) -> Result<(), BackcheckError> {
    let matches = match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        other => {
            return Err(BackcheckError::SchemaMismatch {
                field: path.to_string(),
                detail: format!("unknown schema type '{other}'"),
            });
        }
    };
    if matches {
        return Ok(());
    }
    Err(BackcheckError::SchemaMismatch {
        field: path.to_string(),
        detail: format!("expected type {expected}, got {}", type_name(value)),
    })
}

/// Checks a string against one of the light format rules.
fn check_format(text: &str, format: &str, path: &str) -> Result<(), BackcheckError> {
    let matches = match format {
        "date-time" => DATE_TIME_RE.is_match(text),
        "uuid" => UUID_RE.is_match(text),
        // Unrecognized formats are not enforced.
        _ => true,
    };
    if matches {
        return Ok(());
    }
    Err(BackcheckError::SchemaMismatch {
        field: path.to_string(),
        detail: format!("'{text}' does not match format {format}"),
    })
}

/// Returns a clone with the ignored top-level keys removed, when an object.
fn strip_keys(value: &Value, ignored: &[&str]) -> Value {
    match value {
        Value::Object(map) => {
            let filtered: Map<String, Value> = map
                .iter()
                .filter(|(key, _)| !ignored.contains(&key.as_str()))
                .map(|(key, nested)| (key.clone(), nested.clone()))
                .collect();
            Value::Object(filtered)
        }
        other => other.clone(),
    }
}

/// Names the first key whose values differ between two objects.
fn first_difference(actual: &Value, expected: &Value) -> String {
    if let (Value::Object(a), Value::Object(b)) = (actual, expected) {
        for (key, value) in b {
            if a.get(key) != Some(value) {
                return key.clone();
            }
        }
        for key in a.keys() {
            if !b.contains_key(key) {
                return key.clone();
            }
        }
    }
    "$".to_string()
}

/// Returns a short JSON type name for diagnostics.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Joins a field onto a dotted diagnostic path.
fn join_path(path: &str, field: &str) -> String {
    if path == "$" { field.to_string() } else { format!("{path}.{field}") }
}
