// crates/backcheck-core/src/token.rs
// ============================================================================
// Module: Token Acquisition
// Description: OAuth token fetch for backend contexts.
// Purpose: Exchange configured credentials for bearer tokens, one per context.
// Dependencies: reqwest, serde
// ============================================================================

//! ## Overview
//! Each authenticated backend context carries a [`TokenProfile`] describing
//! its token endpoint and grant parameters. Acquisition is a single
//! form-encoded POST; the opaque bearer token is read from the `access_token`
//! field of the JSON response. Auth failures are hard failures with no retry:
//! a run should fail loudly on a broken grant, not mask it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::BackcheckError;

/// OAuth grant flows supported by the backends under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Resource-owner password grant.
    Password,
    /// Client-credentials grant.
    ClientCredentials,
}

impl GrantType {
    /// Returns the wire value for the `grant_type` form field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
        }
    }
}

/// A secret value redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the underlying value for use in a request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true when the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Grant parameters for one backend context's token endpoint.
///
/// All values come from run configuration; nothing is hard-coded.
#[derive(Debug, Clone)]
pub struct TokenProfile {
    /// Absolute URL of the token endpoint.
    pub token_url: String,
    /// Grant flow to use.
    pub grant: GrantType,
    /// OAuth scope string.
    pub scope: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Secret,
    /// Username, required for the password grant.
    pub username: Option<String>,
    /// Password, required for the password grant.
    pub password: Option<Secret>,
}

/// Token endpoint response shape; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Opaque bearer token.
    access_token: Option<String>,
}

/// Fetches a bearer token for the given profile.
///
/// # Errors
///
/// Returns [`BackcheckError::Config`] when a password grant lacks
/// username or password, [`BackcheckError::Transport`] on network failure,
/// and [`BackcheckError::Token`] on a non-2xx response or a response
/// without an `access_token` field.
pub async fn acquire_token(
    http: &reqwest::Client,
    profile: &TokenProfile,
) -> Result<String, BackcheckError> {
    let form = grant_form(profile)?;
    log::debug!("requesting token from {} ({})", profile.token_url, profile.grant.as_str());
    let response = http
        .post(&profile.token_url)
        .form(&form)
        .send()
        .await
        .map_err(|err| BackcheckError::Transport(format!("token request failed: {err}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackcheckError::Token(format!(
            "token endpoint {} returned status {status}: {body}",
            profile.token_url
        )));
    }
    let payload: Value = response
        .json()
        .await
        .map_err(|err| BackcheckError::Token(format!("token response was not json: {err}")))?;
    let parsed: TokenResponse = serde_json::from_value(payload)
        .map_err(|err| BackcheckError::Token(format!("invalid token payload: {err}")))?;
    parsed.access_token.ok_or_else(|| {
        BackcheckError::Token(format!(
            "token endpoint {} returned no access_token field",
            profile.token_url
        ))
    })
}

/// Builds the form fields for the profile's grant flow.
fn grant_form(profile: &TokenProfile) -> Result<Vec<(&'static str, String)>, BackcheckError> {
    let mut form = vec![
        ("grant_type", profile.grant.as_str().to_string()),
        ("scope", profile.scope.clone()),
        ("client_id", profile.client_id.clone()),
        ("client_secret", profile.client_secret.expose().to_string()),
    ];
    if profile.grant == GrantType::Password {
        let username = profile.username.as_ref().ok_or_else(|| {
            BackcheckError::Config("password grant requires a username".to_string())
        })?;
        let password = profile.password.as_ref().ok_or_else(|| {
            BackcheckError::Config("password grant requires a password".to_string())
        })?;
        form.push(("username", username.clone()));
        form.push(("password", password.expose().to_string()));
    }
    Ok(form)
}
