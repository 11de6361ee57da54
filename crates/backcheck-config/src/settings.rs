// crates/backcheck-config/src/settings.rs
// ============================================================================
// Module: Run Settings
// Description: Typed configuration for a verification run.
// Purpose: Load TOML settings, apply env overrides, validate fail-closed.
// Dependencies: backcheck-core, serde, toml, url
// ============================================================================

//! ## Overview
//! [`Settings`] is the single typed view of everything a run needs: which
//! environment it targets, where each backend lives, and which credentials
//! each token endpoint takes. Values load from TOML and may be overridden by
//! `BACKCHECK_*` environment variables; secrets stay redacted in `Debug`
//! output via [`Secret`].

use std::env;
use std::path::Path;

use backcheck_core::token::Secret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Settings loading and validation failures.
///
/// # Invariants
/// - Variants are stable for failure classification.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("cannot read settings: {0}")]
    Read(String),
    /// Settings file could not be parsed.
    #[error("cannot parse settings: {0}")]
    Parse(String),
    /// A field failed validation.
    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        /// Dotted field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Target environment of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    /// Staging environment.
    Staging,
    /// UAT environment.
    Uat,
}

impl EnvironmentName {
    /// Returns the environment key used by fixture blocks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Uat => "uat",
        }
    }

    /// Parses an environment name.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for anything but `staging`/`uat`.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        match raw {
            "staging" => Ok(Self::Staging),
            "uat" => Ok(Self::Uat),
            other => Err(SettingsError::Invalid {
                field: "environment".to_string(),
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }
}

/// Base URLs per backend context.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseUrls {
    /// Back-office aggregator.
    pub back_office_agg: String,
    /// Back-office BFF.
    pub back_office_bff: String,
    /// Back-office SCOS.
    pub back_office_scos: String,
    /// Client-portal aggregator.
    pub client_portal_agg: String,
    /// Partner API.
    pub partner_api: String,
    /// Integration API.
    pub integration_api: String,
}

/// Token endpoint URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEndpoints {
    /// Shared back-office token endpoint (aggregator, BFF, SCOS).
    pub back_office: String,
    /// Partner token endpoint.
    pub partner: String,
    /// Integration token endpoint.
    pub integration: String,
}

/// Credentials for a resource-owner-password client.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordClient {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Secret,
    /// OAuth scope.
    pub scope: String,
    /// Resource-owner username.
    pub username: String,
    /// Resource-owner password.
    pub password: Secret,
}

/// Credentials for a client-credentials client.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceClient {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Secret,
    /// OAuth scope.
    pub scope: String,
}

/// Per-backend credential sets.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Back-office aggregator/BFF client (password grant).
    pub back_office: PasswordClient,
    /// Back-office SCOS client (password grant).
    pub scos_back_office: PasswordClient,
    /// Partner client (client credentials).
    pub partner: ServiceClient,
    /// Integration client (client credentials).
    pub integration: ServiceClient,
}

/// Client-portal static auth values.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientPortal {
    /// Portal API key sent as `X-Api-Key`.
    pub api_key: Secret,
    /// Test user id sent as `Test-User-Id`.
    pub test_user_id: String,
}

/// Complete run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Target environment.
    pub environment: EnvironmentName,
    /// Top-level suite groups excluded from the run.
    #[serde(default)]
    pub skip_groups: Vec<String>,
    /// Base URLs per context.
    pub base_urls: BaseUrls,
    /// Token endpoints.
    pub token_endpoints: TokenEndpoints,
    /// Credential sets.
    pub credentials: Credentials,
    /// Client-portal auth values.
    pub client_portal: ClientPortal,
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when the TOML does not match the
    /// settings shape.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|err| SettingsError::Parse(err.to_string()))
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Read`] or [`SettingsError::Parse`].
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| SettingsError::Read(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Applies `BACKCHECK_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for a malformed override value.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup; the seam tests use.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for a malformed override value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BACKCHECK_ENV") {
            self.environment = EnvironmentName::parse(&raw)?;
        }
        if let Some(raw) = lookup("BACKCHECK_SKIP_GROUPS") {
            self.skip_groups = raw
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(str::to_string)
                .collect();
        }
        override_text(&lookup, "BACKCHECK_BO_AGG_URL", &mut self.base_urls.back_office_agg);
        override_text(&lookup, "BACKCHECK_BO_BFF_URL", &mut self.base_urls.back_office_bff);
        override_text(&lookup, "BACKCHECK_BO_SCOS_URL", &mut self.base_urls.back_office_scos);
        override_text(&lookup, "BACKCHECK_CP_AGG_URL", &mut self.base_urls.client_portal_agg);
        override_text(&lookup, "BACKCHECK_PARTNER_URL", &mut self.base_urls.partner_api);
        override_text(&lookup, "BACKCHECK_INTEGRATION_URL", &mut self.base_urls.integration_api);
        override_text(&lookup, "BACKCHECK_BO_TOKEN_URL", &mut self.token_endpoints.back_office);
        override_text(&lookup, "BACKCHECK_PARTNER_TOKEN_URL", &mut self.token_endpoints.partner);
        override_text(
            &lookup,
            "BACKCHECK_INTEGRATION_TOKEN_URL",
            &mut self.token_endpoints.integration,
        );
        override_text(&lookup, "BACKCHECK_BO_USERNAME", &mut self.credentials.back_office.username);
        override_secret(
            &lookup,
            "BACKCHECK_BO_PASSWORD",
            &mut self.credentials.back_office.password,
        );
        override_secret(&lookup, "BACKCHECK_CP_API_KEY", &mut self.client_portal.api_key);
        override_text(&lookup, "BACKCHECK_CP_USER_ID", &mut self.client_portal.test_user_id);
        Ok(())
    }

    /// Validates the settings fail-closed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_url("base_urls.back_office_agg", &self.base_urls.back_office_agg)?;
        validate_url("base_urls.back_office_bff", &self.base_urls.back_office_bff)?;
        validate_url("base_urls.back_office_scos", &self.base_urls.back_office_scos)?;
        validate_url("base_urls.client_portal_agg", &self.base_urls.client_portal_agg)?;
        validate_url("base_urls.partner_api", &self.base_urls.partner_api)?;
        validate_url("base_urls.integration_api", &self.base_urls.integration_api)?;
        validate_url("token_endpoints.back_office", &self.token_endpoints.back_office)?;
        validate_url("token_endpoints.partner", &self.token_endpoints.partner)?;
        validate_url("token_endpoints.integration", &self.token_endpoints.integration)?;
        validate_password_client("credentials.back_office", &self.credentials.back_office)?;
        validate_password_client("credentials.scos_back_office", &self.credentials.scos_back_office)?;
        validate_service_client("credentials.partner", &self.credentials.partner)?;
        validate_service_client("credentials.integration", &self.credentials.integration)?;
        if self.client_portal.api_key.is_empty() {
            return Err(invalid("client_portal.api_key", "must not be empty"));
        }
        if self.client_portal.test_user_id.is_empty() {
            return Err(invalid("client_portal.test_user_id", "must not be empty"));
        }
        Ok(())
    }

    /// Returns true when a top-level suite group is excluded from the run.
    #[must_use]
    pub fn skips_group(&self, group: &str) -> bool {
        self.skip_groups.iter().any(|skipped| skipped == group)
    }
}

/// Replaces a text field when the override is present.
fn override_text<F>(lookup: &F, key: &str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *target = value;
    }
}

/// Replaces a secret field when the override is present.
fn override_secret<F>(lookup: &F, key: &str, target: &mut Secret)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *target = Secret::new(value);
    }
}

/// Builds an [`SettingsError::Invalid`] for a field.
fn invalid(field: &str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Validates a URL field.
fn validate_url(field: &str, value: &str) -> Result<(), SettingsError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Url::parse(value).map_err(|err| invalid(field, &format!("not a valid url: {err}")))?;
    Ok(())
}

/// Validates a password-grant credential set.
fn validate_password_client(field: &str, client: &PasswordClient) -> Result<(), SettingsError> {
    if client.client_id.is_empty() {
        return Err(invalid(&format!("{field}.client_id"), "must not be empty"));
    }
    if client.client_secret.is_empty() {
        return Err(invalid(&format!("{field}.client_secret"), "must not be empty"));
    }
    if client.username.is_empty() {
        return Err(invalid(&format!("{field}.username"), "must not be empty"));
    }
    if client.password.is_empty() {
        return Err(invalid(&format!("{field}.password"), "must not be empty"));
    }
    Ok(())
}

/// Validates a client-credentials credential set.
fn validate_service_client(field: &str, client: &ServiceClient) -> Result<(), SettingsError> {
    if client.client_id.is_empty() {
        return Err(invalid(&format!("{field}.client_id"), "must not be empty"));
    }
    if client.client_secret.is_empty() {
        return Err(invalid(&format!("{field}.client_secret"), "must not be empty"));
    }
    Ok(())
}
