// system-tests/tests/suites/reconciliation.rs
// ============================================================================
// Module: Reconciliation Tests
// Description: Spreadsheet import and poll-until-matched scenario.
// Purpose: Prove the poller waits out asynchronous matching exactly.
// Dependencies: system-tests helpers, backcheck-core
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::time::Duration;

use backcheck_core::context::ApiContext;
use backcheck_core::descriptor::Base64Upload;
use backcheck_core::descriptor::HttpMethod;
use backcheck_core::descriptor::RequestBody;
use backcheck_core::descriptor::RequestDescriptor;
use backcheck_core::error::BackcheckError;
use backcheck_core::poll::Poller;
use backcheck_core::verify::verify_status;
use backcheck_core::workflow::WorkflowState;
use helpers::harness::TestRig;
use serde_json::Value;
use serde_json::json;

use crate::helpers;

/// Short poll interval; the stub flips state by counter, not by clock.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Imports one spreadsheet row and returns the captured reference number.
async fn import_row(rig: &TestRig, reference: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut upload = RequestDescriptor::new(HttpMethod::Post, "/bank-transactions");
    upload.body = RequestBody::MultipartBase64(Base64Upload {
        bytes: format!("date,amount,reference\n2026-08-30,99.00,{reference}\n").into_bytes(),
        field_name: "file".to_string(),
        file_name: "import.csv".to_string(),
        content_type: "text/csv".to_string(),
        reference_number: Some(reference.to_string()),
    });
    let response = rig.send(&upload).await?;
    verify_status(&response, 200)?;
    Ok(())
}

/// Predicate extracting the id of a record that reached `full-match`.
fn matched_id(body: &Value, reference: &str) -> Option<String> {
    body.get("data")?.as_array()?.iter().find_map(|record| {
        let record_ref = record.get("referenceNumber")?.as_str()?;
        let status = record.get("reconcileResultStatus")?.as_str()?;
        if record_ref == reference && status == "full-match" {
            Some(record.get("id")?.as_str()?.to_string())
        } else {
            None
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn import_is_confirmed_once_matching_completes() -> Result<(), Box<dyn std::error::Error>> {
    // The stub reports `matching` until the fourth poll.
    let mut rig = TestRig::spawn_with_recon_match_after(4).await?;
    rig.select(ApiContext::BackOfficeBff).await?;

    let reference = "DEP-2026-200001";
    import_row(&rig, reference).await?;

    let listing =
        rig.send(&RequestDescriptor::new(HttpMethod::Get, "/bank-transactions/uploaded/list"))
            .await?;
    verify_status(&listing, 200)?;
    let bank_reference = listing.body["data"][0]["bankReference"].clone();
    let state = WorkflowState::new().capture("bankReference", bank_reference);
    assert_eq!(state.text("bankReference")?, reference);

    let trigger = RequestDescriptor::new(HttpMethod::Post, "/bank-transactions/import")
        .with_json(json!({ "ids": ["imp-1"] }));
    verify_status(&rig.send(&trigger).await?, 200)?;

    let poll = RequestDescriptor::new(HttpMethod::Get, "/bank-transactions/import");
    let poller = Poller::new(POLL_INTERVAL, 10);
    let matched =
        poller.run(|| rig.send(&poll), |body| matched_id(body, reference)).await?;
    assert_eq!(matched, "imp-1");
    assert_eq!(rig.bo_bff.recon_polls(), 4, "no poll may follow a match");

    let confirm = RequestDescriptor::new(HttpMethod::Patch, "/bank-transactions/confirm")
        .with_json(json!({ "ids": [matched] }));
    verify_status(&rig.send(&confirm).await?, 200)?;
    assert_eq!(rig.bo_bff.confirmed_ids(), vec!["imp-1".to_string()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_poll_reports_the_last_observed_payload()
-> Result<(), Box<dyn std::error::Error>> {
    // A record that never matches within the budget.
    let mut rig = TestRig::spawn_with_recon_match_after(99).await?;
    rig.select(ApiContext::BackOfficeBff).await?;
    import_row(&rig, "DEP-2026-200002").await?;

    let poll = RequestDescriptor::new(HttpMethod::Get, "/bank-transactions/import");
    let poller = Poller::new(POLL_INTERVAL, 3);
    let outcome = poller
        .run(|| rig.send(&poll), |body| matched_id(body, "DEP-2026-200002"))
        .await;
    match outcome {
        Err(BackcheckError::PollingExhausted {
            attempts,
            last_observed,
        }) => {
            assert_eq!(attempts, 3);
            assert!(
                last_observed.contains("\"matching\""),
                "exhaustion must carry the pending payload: {last_observed}"
            );
        }
        other => return Err(format!("expected exhaustion, got {other:?}").into()),
    }
    assert_eq!(rig.bo_bff.recon_polls(), 3);
    Ok(())
}
