// crates/backcheck-core/src/fixture.rs
// ============================================================================
// Module: Fixtures
// Description: JSON fixture files supplying request templates per step.
// Purpose: Load descriptor templates and per-environment value blocks.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Fixture files hold one request-descriptor template per scenario step
//! under a top-level `data` object, with optional expected-response
//! snapshots, structural schemas, and per-environment value blocks keyed by
//! environment name (`staging`, `uat`). Templates are read-only; scenarios
//! build a fresh [`RequestDescriptor`] per step and adjust the copy.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::descriptor::HttpMethod;
use crate::descriptor::RequestBody;
use crate::descriptor::RequestDescriptor;
use crate::error::BackcheckError;
use crate::verify::Schema;

/// One step's request template with its expected-response companions.
#[derive(Debug, Clone, Deserialize)]
pub struct StepTemplate {
    /// Header mapping applied to the descriptor.
    #[serde(rename = "requestHeader", default)]
    pub headers: BTreeMap<String, String>,
    /// HTTP method.
    #[serde(rename = "requestApiMethod")]
    pub method: HttpMethod,
    /// URL path template relative to the context base URL.
    #[serde(rename = "requestApiUrl")]
    pub path: String,
    /// Query parameters; numeric fixture values are stringified on build.
    #[serde(rename = "requestQS", default)]
    pub query: BTreeMap<String, Value>,
    /// JSON request body template.
    #[serde(rename = "requestBody", default)]
    pub body: Option<Value>,
    /// Structural schema for the response.
    #[serde(rename = "responseSchema", default)]
    pub schema: Option<Schema>,
    /// Expected-response snapshot for partial-body checks.
    #[serde(rename = "responseBody", default)]
    pub expected_body: Option<Value>,
    /// Per-environment value blocks keyed by environment name.
    #[serde(flatten, default)]
    pub environments: BTreeMap<String, Value>,
}

impl StepTemplate {
    /// Builds a fresh descriptor from the template.
    #[must_use]
    pub fn descriptor(&self) -> RequestDescriptor {
        let body = self.body.clone().map_or(RequestBody::Empty, RequestBody::Json);
        RequestDescriptor {
            method: self.method,
            path: self.path.clone(),
            headers: self.headers.clone(),
            query: self.query.iter().map(|(key, value)| (key.clone(), text_of(value))).collect(),
            body,
        }
    }

    /// Reads a value from the block for the given environment.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] naming the environment or key when
    /// either is missing from the fixture.
    pub fn env_value(&self, environment: &str, key: &str) -> Result<&Value, BackcheckError> {
        let block = self.environments.get(environment).ok_or_else(|| {
            BackcheckError::Config(format!("fixture step has no '{environment}' block"))
        })?;
        block.get(key).ok_or_else(|| {
            BackcheckError::Config(format!("fixture '{environment}' block has no key '{key}'"))
        })
    }
}

/// Wire shape of a fixture file.
#[derive(Debug, Deserialize)]
struct FixtureWire {
    /// Step templates keyed by step name.
    data: BTreeMap<String, StepTemplate>,
}

/// A loaded fixture file.
#[derive(Debug)]
pub struct FixtureFile {
    /// Step templates keyed by step name.
    steps: BTreeMap<String, StepTemplate>,
}

impl FixtureFile {
    /// Parses a fixture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the JSON does not match the
    /// fixture shape.
    pub fn from_json(text: &str) -> Result<Self, BackcheckError> {
        let wire: FixtureWire = serde_json::from_str(text)
            .map_err(|err| BackcheckError::Config(format!("invalid fixture json: {err}")))?;
        Ok(Self {
            steps: wire.data,
        })
    }

    /// Loads a fixture file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the file cannot be read or
    /// parsed.
    pub fn from_path(path: &Path) -> Result<Self, BackcheckError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            BackcheckError::Config(format!("cannot read fixture {}: {err}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Looks up a step template by name.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] naming the step when it is absent.
    pub fn step(&self, name: &str) -> Result<&StepTemplate, BackcheckError> {
        self.steps
            .get(name)
            .ok_or_else(|| BackcheckError::Config(format!("fixture has no step '{name}'")))
    }
}

/// Stringifies a fixture query value without quoting strings.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
