// crates/backcheck-core/src/context.rs
// ============================================================================
// Module: Environment Registry & Context Switcher
// Description: Backend context enumeration and active-context state.
// Purpose: Bind the active base URL and bearer token before a request fires.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Every scenario targets one of a fixed set of backend contexts. The
//! [`ContextRegistry`] maps each context to its base URL and optional token
//! profile; the [`RequestContext`] holds the active binding and the
//! per-context token cache, passed explicitly through test steps instead of
//! living in ambient process state. Switching contexts mid-scenario rebinds
//! the base URL and bearer token; tokens are fetched once per cache key per
//! run unless explicitly invalidated.

use std::collections::HashMap;
use std::path::Path;

use crate::error::BackcheckError;
use crate::token::TokenProfile;
use crate::token::acquire_token;

/// Backend contexts a scenario can target.
///
/// # Invariants
/// - The set is fixed; an unregistered context is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiContext {
    /// Back-office aggregator API.
    BackOfficeAgg,
    /// Back-office BFF (finance/reconciliation surface).
    BackOfficeBff,
    /// Back-office SCOS API (applications, client onboarding).
    BackOfficeScos,
    /// Client-portal aggregator; API-key authenticated, no bearer token.
    ClientPortalAgg,
    /// Partner API.
    PartnerApi,
    /// Integration API.
    IntegrationApi,
}

impl ApiContext {
    /// Returns the stable context label, matching suite directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackOfficeAgg => "BO_Agg",
            Self::BackOfficeBff => "BO_Bff",
            Self::BackOfficeScos => "BO_Scos",
            Self::ClientPortalAgg => "CP_Agg",
            Self::PartnerApi => "PartnerAPI",
            Self::IntegrationApi => "IntegrationAPI",
        }
    }

    /// Returns the token-cache key shared by contexts with common credentials.
    ///
    /// The aggregator and BFF share one back-office token; the client portal
    /// carries no token at all.
    #[must_use]
    pub const fn token_cache_key(self) -> Option<&'static str> {
        match self {
            Self::BackOfficeAgg | Self::BackOfficeBff => Some("access_token_bo"),
            Self::BackOfficeScos => Some("access_token_bo_scos"),
            Self::PartnerApi => Some("access_token_partner"),
            Self::IntegrationApi => Some("access_token_integration"),
            Self::ClientPortalAgg => None,
        }
    }

    /// Derives the context for a suite file from its path.
    ///
    /// Suite files live under a directory named after their context; batch
    /// runs marked `__all` target the integration API.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when no context directory matches.
    pub fn from_suite_path(path: &Path) -> Result<Self, BackcheckError> {
        let text = path.to_string_lossy();
        if text.contains("__all") {
            return Ok(Self::IntegrationApi);
        }
        [
            Self::BackOfficeAgg,
            Self::BackOfficeBff,
            Self::BackOfficeScos,
            Self::ClientPortalAgg,
            Self::PartnerApi,
            Self::IntegrationApi,
        ]
        .into_iter()
        .find(|context| text.contains(context.as_str()))
        .ok_or_else(|| BackcheckError::Config(format!("no context matches suite path: {text}")))
    }
}

/// Registered binding for one context.
#[derive(Debug, Clone)]
pub struct ContextBinding {
    /// Base URL requests against this context are issued to.
    pub base_url: String,
    /// Token profile; `None` for API-key contexts.
    pub token_profile: Option<TokenProfile>,
}

/// Static mapping from context to binding, built from run configuration.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    /// Registered bindings.
    bindings: HashMap<ApiContext, ContextBinding>,
}

impl ContextRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding for a context, replacing any previous one.
    pub fn register(&mut self, context: ApiContext, binding: ContextBinding) {
        self.bindings.insert(context, binding);
    }

    /// Looks up the binding for a context.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the context is unregistered,
    /// before any network call is made.
    pub fn binding(&self, context: ApiContext) -> Result<&ContextBinding, BackcheckError> {
        self.bindings.get(&context).ok_or_else(|| {
            BackcheckError::Config(format!("context {} is not registered", context.as_str()))
        })
    }
}

/// Active request context threaded explicitly through scenario steps.
///
/// # Invariants
/// - At most one context is active at any point.
/// - Token-cache entries live for the run unless invalidated.
#[derive(Debug, Default)]
pub struct RequestContext {
    /// Currently selected context.
    active: Option<ApiContext>,
    /// Base URL bound by the last select.
    base_url: Option<String>,
    /// Bearer token bound by the last select, if the context has one.
    bearer: Option<String>,
    /// Cached tokens keyed by [`ApiContext::token_cache_key`].
    token_cache: HashMap<&'static str, String>,
}

impl RequestContext {
    /// Creates a context with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a backend context, rebinding base URL and bearer token.
    ///
    /// Acquires and caches a token on the first select of an authenticated
    /// context; later selects sharing the cache key reuse the token. The run
    /// is strictly sequential, so acquisition blocks the next step.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] for an unregistered context and
    /// token-acquisition errors unchanged.
    pub async fn select(
        &mut self,
        context: ApiContext,
        registry: &ContextRegistry,
        http: &reqwest::Client,
    ) -> Result<(), BackcheckError> {
        let binding = registry.binding(context)?;
        self.base_url = Some(binding.base_url.clone());
        self.active = Some(context);
        match (&binding.token_profile, context.token_cache_key()) {
            (Some(profile), Some(key)) => {
                if !self.token_cache.contains_key(key) {
                    let token = acquire_token(http, profile).await?;
                    log::info!("acquired token for context {}", context.as_str());
                    self.token_cache.insert(key, token);
                }
                self.bearer = self.token_cache.get(key).cloned();
            }
            _ => {
                self.bearer = None;
            }
        }
        Ok(())
    }

    /// Clears the cached token for a context so the next select re-acquires.
    pub fn invalidate(&mut self, context: ApiContext) {
        if let Some(key) = context.token_cache_key() {
            self.token_cache.remove(key);
            if self.active == Some(context) {
                self.bearer = None;
            }
        }
    }

    /// Returns the currently selected context.
    #[must_use]
    pub const fn active(&self) -> Option<ApiContext> {
        self.active
    }

    /// Returns the active base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when no context has been selected.
    pub fn base_url(&self) -> Result<&str, BackcheckError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| BackcheckError::Config("no context selected".to_string()))
    }

    /// Returns the active bearer token, if the context carries one.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Overrides the active bearer token; used by negative-auth checks.
    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer = token;
    }
}
