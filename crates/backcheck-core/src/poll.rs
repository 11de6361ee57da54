// crates/backcheck-core/src/poll.rs
// ============================================================================
// Module: Workflow Poller
// Description: Fixed-interval polling until a predicate matches.
// Purpose: Wait out asynchronous backend matching within a retry budget.
// Dependencies: tokio, serde_json
// ============================================================================

//! ## Overview
//! Reconciliation and settlement paths complete asynchronously after the
//! triggering call, so dependent steps poll: re-issue a request, run a
//! predicate over the parsed body, and either proceed, retry after a fixed
//! delay, or exhaust the budget. Exhaustion is its own error kind carrying
//! the last observed payload; "it never happened" must read differently
//! from "it happened differently than expected". This is the only retry
//! behavior in the suite, and it is a fixed-interval poll, not backoff.

use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;

use crate::dispatch::ApiResponse;
use crate::error::BackcheckError;

/// Fixed-interval poller with a bounded attempt budget.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    /// Delay between attempts.
    interval: Duration,
    /// Maximum number of attempts before exhaustion.
    max_attempts: u32,
}

impl Poller {
    /// Creates a poller with a fixed inter-attempt delay and budget.
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Re-issues `operation` until `predicate` extracts a match.
    ///
    /// The predicate inspects the parsed response body and returns the
    /// extracted value on a match. Once matched, no further attempt is
    /// issued. Predicates are bespoke per call site; the reconciliation
    /// flow, for example, looks for a record that reached `full-match`.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::PollingExhausted`] with the serialized last
    /// observed body when the budget runs out, and propagates operation
    /// errors (transport, status checks inside the closure) immediately.
    pub async fn run<T, Op, Fut, Pred>(
        &self,
        mut operation: Op,
        predicate: Pred,
    ) -> Result<T, BackcheckError>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<ApiResponse, BackcheckError>>,
        Pred: Fn(&Value) -> Option<T>,
    {
        let mut last_observed = Value::Null;
        for attempt in 1..=self.max_attempts {
            let response = operation().await?;
            if let Some(matched) = predicate(&response.body) {
                log::debug!("poll matched on attempt {attempt}");
                return Ok(matched);
            }
            last_observed = response.body;
            if attempt < self.max_attempts {
                log::debug!("poll attempt {attempt} pending, retrying");
                sleep(self.interval).await;
            }
        }
        Err(BackcheckError::PollingExhausted {
            attempts: self.max_attempts,
            last_observed: last_observed.to_string(),
        })
    }
}
