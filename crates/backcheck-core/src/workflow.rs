// crates/backcheck-core/src/workflow.rs
// ============================================================================
// Module: Workflow State
// Description: Explicit per-scenario record of captured fields.
// Purpose: Thread extracted values from one step into later steps.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Multi-step scenarios capture fields from earlier responses (ids,
//! reference numbers, batch ids) and feed them into later descriptors. The
//! [`WorkflowState`] makes that flow explicit: each step reads from the
//! state and returns an extended copy instead of mutating shared fixture
//! objects in place, so no step depends on hidden aliasing.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::BackcheckError;

/// Captured fields of one scenario, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    /// Captured values in insertion-independent order.
    captured: BTreeMap<String, Value>,
}

impl WorkflowState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an extended copy with one more captured value.
    #[must_use]
    pub fn capture(mut self, key: impl Into<String>, value: Value) -> Self {
        self.captured.insert(key.into(), value);
        self
    }

    /// Looks up a captured value.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] naming the key when it was never
    /// captured; a step reading a field no earlier step produced is a wiring
    /// mistake, not a backend failure.
    pub fn value(&self, key: &str) -> Result<&Value, BackcheckError> {
        self.captured.get(key).ok_or_else(|| {
            BackcheckError::Config(format!("workflow state has no captured value '{key}'"))
        })
    }

    /// Looks up a captured value as a string slice.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the key is missing or the
    /// value is not a string.
    pub fn text(&self, key: &str) -> Result<&str, BackcheckError> {
        self.value(key)?.as_str().ok_or_else(|| {
            BackcheckError::Config(format!("captured value '{key}' is not a string"))
        })
    }

    /// Returns true when a value was captured under the key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.captured.contains_key(key)
    }
}
