// crates/backcheck-config/src/lib.rs
// ============================================================================
// Module: Backcheck Config Library
// Description: Typed run settings and context wiring.
// Purpose: Load, override, validate, and wire per-backend configuration.
// Dependencies: backcheck-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Run configuration for Backcheck: per-backend base URLs, token endpoints,
//! OAuth credentials, and the client-portal API key, loaded from a TOML file
//! with `BACKCHECK_*` environment overrides applied on top. Validation is
//! strict and fail-closed; a misconfigured run must fail before any network
//! call, naming the offending field.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod settings;
pub mod wiring;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use settings::BaseUrls;
pub use settings::ClientPortal;
pub use settings::Credentials;
pub use settings::EnvironmentName;
pub use settings::PasswordClient;
pub use settings::ServiceClient;
pub use settings::Settings;
pub use settings::SettingsError;
pub use settings::TokenEndpoints;
pub use wiring::context_registry;
