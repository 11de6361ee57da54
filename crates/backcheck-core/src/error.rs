// crates/backcheck-core/src/error.rs
// ============================================================================
// Module: Backcheck Errors
// Description: Error taxonomy for the request orchestration layer.
// Purpose: Distinguish configuration, transport, check, and polling failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Errors are split along the lines a test run cares about: configuration
//! errors fail before any network call, transport errors surface the
//! underlying HTTP failure, check failures carry enough context to diagnose
//! without a re-run, and polling exhaustion is distinct from a plain check
//! failure so "it never happened" reads differently from "it happened
//! differently than expected".

use thiserror::Error;

/// Failure modes of the request orchestration layer.
///
/// # Invariants
/// - Variants are stable for failure classification.
#[derive(Debug, Error)]
pub enum BackcheckError {
    /// Invalid or missing configuration; raised before any network call.
    #[error("configuration error: {0}")]
    Config(String),
    /// Transport-level failure (timeout, refused connection, bad TLS).
    #[error("transport error: {0}")]
    Transport(String),
    /// Token endpoint rejected the grant request or returned no token.
    #[error("token acquisition failed: {0}")]
    Token(String),
    /// Response status did not match the expected status.
    #[error("expected status {expected}, got {actual}: {detail}")]
    StatusMismatch {
        /// Status the check expected.
        expected: u16,
        /// Status the response carried.
        actual: u16,
        /// Error detail extracted from the response body.
        detail: String,
    },
    /// Response body did not match the expected values.
    #[error("body mismatch for key '{key}': {detail}")]
    BodyMismatch {
        /// Top-level key (or pseudo-key) that failed the comparison.
        key: String,
        /// Expected-vs-actual description.
        detail: String,
    },
    /// Response body violated the structural schema.
    #[error("schema violation at '{field}': {detail}")]
    SchemaMismatch {
        /// Dotted path of the offending field.
        field: String,
        /// Description of the violation.
        detail: String,
    },
    /// Polling budget exhausted before the predicate matched.
    #[error("polling exhausted after {attempts} attempts; last observed: {last_observed}")]
    PollingExhausted {
        /// Number of attempts issued.
        attempts: u32,
        /// Serialized last observed response body.
        last_observed: String,
    },
}
