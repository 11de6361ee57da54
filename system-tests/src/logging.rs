// system-tests/src/logging.rs
// ============================================================================
// Module: System Test Logging
// Description: One-shot logger initialization for test binaries.
// Purpose: Route crate logs through env_logger in capture-friendly mode.
// Dependencies: env_logger
// ============================================================================

//! ## Overview
//! Test binaries call [`init`] before their first dispatch so `log` output
//! from the core crates lands in the captured test output. Repeat calls are
//! no-ops; parallel test binaries each initialize their own process.

use std::sync::Once;

/// Guards one-time logger setup per process.
static INIT: Once = Once::new();

/// Initializes env_logger for a test binary.
pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
