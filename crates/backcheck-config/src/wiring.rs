// crates/backcheck-config/src/wiring.rs
// ============================================================================
// Module: Context Wiring
// Description: Builds the context registry from run settings.
// Purpose: Map each backend context to its base URL and token profile.
// Dependencies: backcheck-core
// ============================================================================

//! ## Overview
//! The wiring mirrors how the backends share credentials: the back-office
//! aggregator and BFF use one password-grant client, SCOS has its own,
//! partner and integration use client-credentials clients, and the client
//! portal carries no token profile at all (API-key headers instead).

use backcheck_core::context::ApiContext;
use backcheck_core::context::ContextBinding;
use backcheck_core::context::ContextRegistry;
use backcheck_core::token::GrantType;
use backcheck_core::token::TokenProfile;

use crate::settings::PasswordClient;
use crate::settings::ServiceClient;
use crate::settings::Settings;

/// Builds the full context registry for a run.
#[must_use]
pub fn context_registry(settings: &Settings) -> ContextRegistry {
    let mut registry = ContextRegistry::new();
    registry.register(
        ApiContext::BackOfficeAgg,
        ContextBinding {
            base_url: settings.base_urls.back_office_agg.clone(),
            token_profile: Some(password_profile(
                &settings.token_endpoints.back_office,
                &settings.credentials.back_office,
            )),
        },
    );
    registry.register(
        ApiContext::BackOfficeBff,
        ContextBinding {
            base_url: settings.base_urls.back_office_bff.clone(),
            token_profile: Some(password_profile(
                &settings.token_endpoints.back_office,
                &settings.credentials.back_office,
            )),
        },
    );
    registry.register(
        ApiContext::BackOfficeScos,
        ContextBinding {
            base_url: settings.base_urls.back_office_scos.clone(),
            token_profile: Some(password_profile(
                &settings.token_endpoints.back_office,
                &settings.credentials.scos_back_office,
            )),
        },
    );
    registry.register(
        ApiContext::ClientPortalAgg,
        ContextBinding {
            base_url: settings.base_urls.client_portal_agg.clone(),
            token_profile: None,
        },
    );
    registry.register(
        ApiContext::PartnerApi,
        ContextBinding {
            base_url: settings.base_urls.partner_api.clone(),
            token_profile: Some(service_profile(
                &settings.token_endpoints.partner,
                &settings.credentials.partner,
            )),
        },
    );
    registry.register(
        ApiContext::IntegrationApi,
        ContextBinding {
            base_url: settings.base_urls.integration_api.clone(),
            token_profile: Some(service_profile(
                &settings.token_endpoints.integration,
                &settings.credentials.integration,
            )),
        },
    );
    registry
}

/// Builds a password-grant token profile.
fn password_profile(token_url: &str, client: &PasswordClient) -> TokenProfile {
    TokenProfile {
        token_url: token_url.to_string(),
        grant: GrantType::Password,
        scope: client.scope.clone(),
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        username: Some(client.username.clone()),
        password: Some(client.password.clone()),
    }
}

/// Builds a client-credentials token profile.
fn service_profile(token_url: &str, client: &ServiceClient) -> TokenProfile {
    TokenProfile {
        token_url: token_url.to_string(),
        grant: GrantType::ClientCredentials,
        scope: client.scope.clone(),
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        username: None,
        password: None,
    }
}
