// system-tests/src/config.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep system-test timeouts consistent and configurable across suites.
// Dependencies: std
// ============================================================================

//! ## Overview
//! System-test timeouts default to a value suitable for in-process stub
//! backends; `BACKCHECK_SYSTEM_TEST_TIMEOUT_SEC` raises them for slower
//! machines. The override acts as a minimum so it never shortens an
//! explicitly longer test timeout.

use std::env;
use std::time::Duration;

/// Environment variable raising the per-suite timeout.
const ENV_TIMEOUT_SECS: &str = "BACKCHECK_SYSTEM_TEST_TIMEOUT_SEC";

/// Default request timeout against in-process stubs.
pub const DEFAULT_STUB_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the effective timeout, honoring the env override when set.
#[must_use]
pub fn resolve_timeout(requested: Duration) -> Duration {
    match env::var(ENV_TIMEOUT_SECS) {
        Ok(raw) => parse_timeout_secs(&raw).map_or(requested, |floor| requested.max(floor)),
        Err(_) => requested,
    }
}

/// Parses a positive integer number of seconds.
fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    let secs: u64 = raw.trim().parse().ok()?;
    if secs == 0 {
        return None;
    }
    Some(Duration::from_secs(secs))
}
