// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Test Rig
// Description: End-to-end wiring of settings, registry, and stub backends.
// Purpose: Give every suite a fully configured run against live stubs.
// Dependencies: backcheck-config, backcheck-core, system-tests
// ============================================================================

//! ## Overview
//! A [`TestRig`] spawns one stub per backend context, renders a settings
//! document pointing every base URL and token endpoint at the stubs, and
//! builds the same registry and dispatcher a real run would use. Suites then
//! exercise the production select/dispatch path unchanged.

use backcheck_config::Settings;
use backcheck_config::context_registry;
use backcheck_core::context::ApiContext;
use backcheck_core::context::ContextRegistry;
use backcheck_core::context::RequestContext;
use backcheck_core::descriptor::RequestDescriptor;
use backcheck_core::dispatch::ApiResponse;
use backcheck_core::dispatch::Dispatcher;
use backcheck_core::error::BackcheckError;
use system_tests::config::DEFAULT_STUB_TIMEOUT;
use system_tests::config::resolve_timeout;
use system_tests::logging;

use super::backend_stub::StubBackend;
use super::backend_stub::spawn_backend;
use super::backend_stub::spawn_backend_with_match_after;

/// Fully wired run against in-process stub backends.
pub struct TestRig {
    /// Run settings rendered from the stub addresses.
    pub settings: Settings,
    /// Context registry built from the settings.
    pub registry: ContextRegistry,
    /// Production dispatcher with the stub-tuned timeout.
    pub dispatcher: Dispatcher,
    /// Active request context threaded through scenario steps.
    pub context: RequestContext,
    /// Back-office aggregator stub; also serves the shared token endpoint.
    pub bo_agg: StubBackend,
    /// Back-office BFF stub; hosts the reconciliation endpoints.
    pub bo_bff: StubBackend,
    /// Back-office SCOS stub.
    pub bo_scos: StubBackend,
    /// Client-portal aggregator stub.
    pub cp_agg: StubBackend,
    /// Partner API stub.
    pub partner: StubBackend,
    /// Integration API stub.
    pub integration: StubBackend,
}

impl TestRig {
    /// Spawns a rig whose reconciliation record matches on the first poll.
    pub async fn spawn() -> Result<Self, String> {
        Self::spawn_with_recon_match_after(1).await
    }

    /// Spawns a rig whose reconciliation record only reaches `full-match`
    /// from the given BFF poll count on.
    pub async fn spawn_with_recon_match_after(recon_match_after: u32) -> Result<Self, String> {
        logging::init();
        let bo_agg = spawn_backend("bo-agg").await?;
        let bo_bff = spawn_backend_with_match_after("bo-bff", recon_match_after).await?;
        let bo_scos = spawn_backend("bo-scos").await?;
        let cp_agg = spawn_backend("cp-agg").await?;
        let partner = spawn_backend("partner").await?;
        let integration = spawn_backend("integration").await?;

        let settings = Settings::from_toml_str(&settings_toml(
            bo_agg.base_url(),
            bo_bff.base_url(),
            bo_scos.base_url(),
            cp_agg.base_url(),
            partner.base_url(),
            integration.base_url(),
            &bo_agg.token_url(),
            &partner.token_url(),
            &integration.token_url(),
        ))
        .map_err(|err| format!("settings did not parse: {err}"))?;
        settings.validate().map_err(|err| format!("settings did not validate: {err}"))?;

        let registry = context_registry(&settings);
        let dispatcher = Dispatcher::with_timeout(resolve_timeout(DEFAULT_STUB_TIMEOUT))
            .map_err(|err| format!("dispatcher did not build: {err}"))?;
        Ok(Self {
            settings,
            registry,
            dispatcher,
            context: RequestContext::new(),
            bo_agg,
            bo_bff,
            bo_scos,
            cp_agg,
            partner,
            integration,
        })
    }

    /// Selects a backend context on the rig's request context.
    pub async fn select(&mut self, context: ApiContext) -> Result<(), BackcheckError> {
        self.context.select(context, &self.registry, self.dispatcher.client()).await
    }

    /// Dispatches a descriptor against the currently selected context.
    pub async fn send(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ApiResponse, BackcheckError> {
        self.dispatcher.send(descriptor, &self.context).await
    }
}

/// Renders a complete settings document targeting the stub addresses.
#[allow(clippy::too_many_arguments, reason = "One argument per stub endpoint keeps call sites explicit.")]
fn settings_toml(
    bo_agg: &str,
    bo_bff: &str,
    bo_scos: &str,
    cp_agg: &str,
    partner: &str,
    integration: &str,
    bo_token: &str,
    partner_token: &str,
    integration_token: &str,
) -> String {
    format!(
        r#"
environment = "staging"

[base_urls]
back_office_agg = "{bo_agg}"
back_office_bff = "{bo_bff}"
back_office_scos = "{bo_scos}"
client_portal_agg = "{cp_agg}"
partner_api = "{partner}"
integration_api = "{integration}"

[token_endpoints]
back_office = "{bo_token}"
partner = "{partner_token}"
integration = "{integration_token}"

[credentials.back_office]
client_id = "bo-client"
client_secret = "bo-secret"
scope = "boapi"
username = "qa-bo"
password = "qa-bo-pass"

[credentials.scos_back_office]
client_id = "scos-client"
client_secret = "scos-secret"
scope = "scos.boapi"
username = "qa-scos"
password = "qa-scos-pass"

[credentials.partner]
client_id = "partner-client"
client_secret = "partner-secret"
scope = "partner.api"

[credentials.integration]
client_id = "integration-client"
client_secret = "integration-secret"
scope = "integration.api"

[client_portal]
api_key = "portal-key"
test_user_id = "portal-user-1"
"#
    )
}
