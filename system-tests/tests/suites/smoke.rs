// system-tests/tests/suites/smoke.rs
// ============================================================================
// Module: Smoke Tests
// Description: Minimal end-to-end dispatches against stub backends.
// Purpose: Prove settings, registry, token, and dispatch wiring end to end.
// Dependencies: system-tests helpers, backcheck-core
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use backcheck_core::context::ApiContext;
use backcheck_core::descriptor::HttpMethod;
use backcheck_core::descriptor::RequestDescriptor;
use backcheck_core::verify::verify_status;
use helpers::harness::TestRig;
use serde_json::Value;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn back_office_round_trip_carries_a_bearer() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = TestRig::spawn().await?;
    rig.select(ApiContext::BackOfficeAgg).await?;

    let descriptor = RequestDescriptor::new(HttpMethod::Get, "/whoami");
    let response = rig.send(&descriptor).await?;
    verify_status(&response, 200)?;
    assert_eq!(response.body["backend"], Value::String("bo-agg".to_string()));
    let authorization = response.body["authorization"].as_str().unwrap_or_default();
    assert!(
        authorization.starts_with("Bearer bo-agg-token-"),
        "unexpected authorization header: {authorization}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn client_portal_dispatch_has_no_bearer() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = TestRig::spawn().await?;
    rig.select(ApiContext::ClientPortalAgg).await?;

    let api_key = rig.settings.client_portal.api_key.expose().to_string();
    let test_user_id = rig.settings.client_portal.test_user_id.clone();
    let mut descriptor = RequestDescriptor::new(HttpMethod::Get, "/whoami");
    descriptor.apply_portal_headers("entity-1", &api_key, &test_user_id);

    let response = rig.send(&descriptor).await?;
    verify_status(&response, 200)?;
    assert_eq!(response.body["backend"], Value::String("cp-agg".to_string()));
    assert!(response.body["authorization"].is_null(), "portal requests must not carry a bearer");
    assert_eq!(rig.cp_agg.token_fetches(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn body_normalization_handles_text_and_empty() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = TestRig::spawn().await?;
    rig.select(ApiContext::BackOfficeAgg).await?;

    let health = rig.send(&RequestDescriptor::new(HttpMethod::Get, "/health")).await?;
    verify_status(&health, 200)?;
    assert_eq!(health.body, Value::String("OK".to_string()));

    let empty = rig.send(&RequestDescriptor::new(HttpMethod::Post, "/echo/empty")).await?;
    verify_status(&empty, 200)?;
    assert!(empty.body.is_null(), "empty bodies normalize to null");
    Ok(())
}
