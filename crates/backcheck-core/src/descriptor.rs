// crates/backcheck-core/src/descriptor.rs
// ============================================================================
// Module: Request Descriptor
// Description: Declarative description of one HTTP call.
// Purpose: Carry method, URL template, headers, query, and body per step.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`RequestDescriptor`] declares one HTTP call: method, URL template with
//! `{placeholder}` tokens, header and query mappings, and a tagged
//! [`RequestBody`]. The body variant selects the submission strategy
//! explicitly; the dispatcher never guesses a multipart convention from the
//! payload shape. Descriptors are built from fixtures and adjusted per step
//! as earlier responses feed later calls.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// HTTP methods used by the backends under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// File payload for the back-office binary document-upload contract.
///
/// Maps to the `FormFile`/`Size`/`ContentType`/`DocumentType`/`FileId`
/// multipart parts that backend expects.
#[derive(Debug, Clone)]
pub struct BinaryUpload {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// File name sent with the `FormFile` part.
    pub file_name: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Declared file size in bytes.
    pub size: u64,
    /// Backend document-type discriminator.
    pub document_type: String,
    /// Backend file id; zero for a fresh upload.
    pub file_id: i64,
    /// Client to upload on behalf of, when delegated.
    pub upload_client_id: Option<String>,
}

/// File payload for the BFF base64 spreadsheet-import contract.
///
/// The file content is base64-encoded into the named field; the response to
/// this upload may be empty or non-JSON and is tolerated by the dispatcher.
#[derive(Debug, Clone)]
pub struct Base64Upload {
    /// Raw file content, encoded at dispatch time.
    pub bytes: Vec<u8>,
    /// Multipart field name carrying the file.
    pub field_name: String,
    /// File name sent alongside the payload.
    pub file_name: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Reference number linking the import to an instruction.
    pub reference_number: Option<String>,
}

/// Tagged request payload; the variant selects the submission strategy.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No payload.
    #[default]
    Empty,
    /// Standard JSON payload; the common case.
    Json(Value),
    /// Binary multipart upload (back-office document contract).
    MultipartBinary(BinaryUpload),
    /// Base64 multipart upload (BFF import contract).
    MultipartBase64(Base64Upload),
}

/// Declarative description of one HTTP call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL path template relative to the active base URL.
    pub path: String,
    /// Request headers; explicit entries win over ambient injection.
    pub headers: BTreeMap<String, String>,
    /// Query-string parameters.
    pub query: BTreeMap<String, String>,
    /// Tagged request payload.
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Creates a descriptor with no headers, query, or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Sets or replaces a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Sets or replaces a query parameter.
    pub fn set_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.insert(name.into(), value.into());
    }

    /// Substitutes a `{placeholder}` token in the URL template.
    ///
    /// Later steps resolve ids captured from earlier responses this way,
    /// e.g. `{instructionId}` once the create call has returned.
    pub fn resolve_url(&mut self, placeholder: &str, value: &str) {
        self.path = self.path.replace(placeholder, value);
    }

    /// Applies the client-portal header preset.
    ///
    /// The client-portal aggregator authenticates with an API key and a test
    /// user id instead of a bearer token.
    pub fn apply_portal_headers(
        &mut self,
        service_entity_id: &str,
        api_key: &str,
        test_user_id: &str,
    ) {
        self.set_header("Service-Entity-Id", service_entity_id);
        self.set_header("X-Api-Key", api_key);
        self.set_header("Test-User-Id", test_user_id);
    }

    /// Applies the delegated-client header used by SCOS endpoints.
    pub fn apply_delegated_client(&mut self, client_id: &str) {
        self.set_header("X-Delegated-Client", client_id);
    }
}
