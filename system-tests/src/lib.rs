// system-tests/src/lib.rs
// ============================================================================
// Module: Backcheck System Tests Library
// Description: Shared configuration and helpers for system test scenarios.
// Purpose: Provide common utilities for Backcheck system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration and helper utilities used by the
//! Backcheck system-test binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod logging;
