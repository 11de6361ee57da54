// crates/backcheck-core/src/lib.rs
// ============================================================================
// Module: Backcheck Core Library
// Description: Request orchestration layer for API verification runs.
// Purpose: Expose descriptors, contexts, dispatch, checks, and polling.
// Dependencies: reqwest, serde, thiserror
// ============================================================================

//! ## Overview
//! Backcheck core is the request-orchestration and environment-context layer
//! of an API verification suite. Test scenarios declare request descriptors,
//! select a backend context, dispatch the call, and chain response checks;
//! captured fields thread through an explicit workflow state into later steps.
//!
//! Invariants:
//! - Execution is strictly sequential: one request in flight at a time.
//! - At most one context is active per [`RequestContext`] at any point.
//! - Dispatch never fails on a non-2xx status; checks decide pass/fail.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod fixture;
pub mod poll;
pub mod token;
pub mod verify;
pub mod workflow;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use context::ApiContext;
pub use context::ContextBinding;
pub use context::ContextRegistry;
pub use context::RequestContext;
pub use descriptor::Base64Upload;
pub use descriptor::BinaryUpload;
pub use descriptor::HttpMethod;
pub use descriptor::RequestBody;
pub use descriptor::RequestDescriptor;
pub use dispatch::ApiResponse;
pub use dispatch::Dispatcher;
pub use error::BackcheckError;
pub use poll::Poller;
pub use token::GrantType;
pub use token::Secret;
pub use token::TokenProfile;
pub use verify::Schema;
pub use workflow::WorkflowState;
