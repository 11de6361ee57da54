// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared stub backends and rig wiring for the suites.
// Purpose: Keep scenario files focused on behavior, not setup.
// Dependencies: system-tests
// ============================================================================

//! ## Overview
//! Shared helpers for Backcheck system-tests: stub backends standing in for
//! the real services and a rig wiring settings, registry, and dispatcher.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod harness;
