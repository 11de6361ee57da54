// crates/backcheck-core/src/dispatch.rs
// ============================================================================
// Module: Request Dispatcher
// Description: Performs one HTTP exchange per request descriptor.
// Purpose: Build, send, and normalize requests for the active context.
// Dependencies: reqwest, base64, serde_json
// ============================================================================

//! ## Overview
//! The dispatcher turns a [`RequestDescriptor`] plus the active
//! [`RequestContext`] into exactly one HTTP exchange and a normalized
//! [`ApiResponse`]. The tagged body variant selects among three submission
//! strategies (JSON, binary multipart, base64 multipart). A non-2xx status
//! is returned, never raised, so negative-path checks reuse the same
//! pipeline; only transport failures surface as errors.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde_json::Value;

use crate::context::RequestContext;
use crate::descriptor::Base64Upload;
use crate::descriptor::BinaryUpload;
use crate::descriptor::HttpMethod;
use crate::descriptor::RequestBody;
use crate::descriptor::RequestDescriptor;
use crate::error::BackcheckError;

/// Fixed upper bound per request; generous because backend settlement paths
/// can be slow under load.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(50);

/// Environment override raising the per-request timeout.
const ENV_TIMEOUT_SECS: &str = "BACKCHECK_REQUEST_TIMEOUT_SEC";

/// Normalized response returned by every dispatch.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `Null` for an empty body, a JSON string for
    /// non-JSON text.
    pub body: Value,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
}

/// Issues HTTP requests for descriptors against the active context.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Underlying HTTP client with the run's timeout applied.
    client: Client,
}

impl Dispatcher {
    /// Creates a dispatcher with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the HTTP client cannot be
    /// built.
    pub fn new() -> Result<Self, BackcheckError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Creates a dispatcher with an explicit timeout.
    ///
    /// `BACKCHECK_REQUEST_TIMEOUT_SEC` acts as a minimum so an environment
    /// override never shortens an explicitly longer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when the HTTP client cannot be
    /// built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, BackcheckError> {
        let client = Client::builder()
            .timeout(resolve_timeout(timeout))
            .build()
            .map_err(|err| BackcheckError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
        })
    }

    /// Returns the underlying HTTP client, shared with token acquisition.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Performs exactly one HTTP exchange for the descriptor.
    ///
    /// Injects `Authorization: Bearer <token>` when the context carries a
    /// token and the descriptor set no explicit `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`BackcheckError::Config`] when no context is selected and
    /// [`BackcheckError::Transport`] on timeout or connection failure. A
    /// non-2xx status is not an error.
    pub async fn send(
        &self,
        descriptor: &RequestDescriptor,
        ctx: &RequestContext,
    ) -> Result<ApiResponse, BackcheckError> {
        let url = join_url(ctx.base_url()?, &descriptor.path);
        log::debug!("{} {url}", descriptor.method.as_str());
        let mut request = self.client.request(method_of(descriptor.method), &url);

        let query: Vec<(&String, &String)> = descriptor.query.iter().collect();
        if !query.is_empty() {
            request = request.query(&query);
        }
        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(token) = ctx.bearer_token()
            && !has_authorization_header(descriptor)
        {
            request = request.bearer_auth(token);
        }

        request = match &descriptor.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::MultipartBinary(upload) => request.multipart(binary_form(upload)?),
            RequestBody::MultipartBase64(upload) => request.multipart(base64_form(upload)?),
        };

        let response = request
            .send()
            .await
            .map_err(|err| BackcheckError::Transport(format!("{} {url}: {err}", descriptor.method.as_str())))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|err| BackcheckError::Transport(format!("reading body of {url}: {err}")))?;
        let body = normalize_body(&text);
        log::debug!("{} {url} -> {status}", descriptor.method.as_str());
        Ok(ApiResponse {
            status,
            body,
            headers,
        })
    }
}

/// Joins the base URL and path without doubling the separating slash.
///
/// Paths are absolute (`/instruction/...`), so a configured base URL with a
/// trailing slash must not produce `//`.
fn join_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

/// Returns true when the descriptor carries an explicit Authorization header.
fn has_authorization_header(descriptor: &RequestDescriptor) -> bool {
    descriptor.headers.keys().any(|name| name.eq_ignore_ascii_case("authorization"))
}

/// Maps the descriptor method onto the wire method.
const fn method_of(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Builds the back-office binary document-upload form.
fn binary_form(upload: &BinaryUpload) -> Result<Form, BackcheckError> {
    let part = Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)
        .map_err(|err| {
            BackcheckError::Config(format!("invalid content type {}: {err}", upload.content_type))
        })?;
    let mut form = Form::new()
        .part("FormFile", part)
        .text("Size", upload.size.to_string())
        .text("ContentType", upload.content_type.clone())
        .text("DocumentType", upload.document_type.clone())
        .text("FileId", upload.file_id.to_string());
    if let Some(client_id) = &upload.upload_client_id {
        form = form.text("UploadFileClientId", client_id.clone());
    }
    Ok(form)
}

/// Builds the BFF base64 spreadsheet-import form.
fn base64_form(upload: &Base64Upload) -> Result<Form, BackcheckError> {
    let encoded = BASE64.encode(&upload.bytes);
    let part = Part::text(encoded).file_name(upload.file_name.clone()).mime_str(&upload.content_type).map_err(
        |err| {
            BackcheckError::Config(format!("invalid content type {}: {err}", upload.content_type))
        },
    )?;
    let mut form = Form::new()
        .part(upload.field_name.clone(), part)
        .text("fileName", upload.file_name.clone());
    if let Some(reference) = &upload.reference_number {
        form = form.text("referenceNumber", reference.clone());
    }
    Ok(form)
}

/// Normalizes a response body into a JSON value.
///
/// Empty bodies (the BFF upload contract replies with nothing) become
/// `Null`; non-JSON text becomes a JSON string so checks can still inspect
/// it.
fn normalize_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Returns the effective timeout, honoring the environment minimum.
fn resolve_timeout(requested: Duration) -> Duration {
    match env::var(ENV_TIMEOUT_SECS) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => requested.max(Duration::from_secs(secs)),
            _ => {
                log::warn!("ignoring {ENV_TIMEOUT_SECS}: must be a positive integer of seconds");
                requested
            }
        },
        Err(_) => requested,
    }
}
