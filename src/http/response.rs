//! Outbound response model.
//!
//! # Responsibilities
//! - Hold status, reason phrase, ordered headers and body bytes
//! - Keep `Content-Length` equal to the body length at all times
//! - Serialize structured bodies as JSON
//!
//! # Design Decisions
//! - `Content-Length` is owned by the response; callers cannot set it
//! - Header names keep the caller's casing; replacement is case-insensitive
//! - Unknown status codes get the reason phrase "Unknown"

use serde::Serialize;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// An HTTP response ready for the serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// An empty response with the canonical reason phrase for `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: canonical_reason(status).to_string(),
            headers: vec![(CONTENT_LENGTH.to_string(), "0".to_string())],
            body: Vec::new(),
        }
    }

    /// A response whose body is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status)
            .with_header(CONTENT_TYPE, APPLICATION_JSON)
            .with_body(body))
    }

    /// A plain-text response.
    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(CONTENT_TYPE, TEXT_PLAIN)
            .with_body(text.into().into_bytes())
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    /// Generic failure response. Never carries failure details.
    pub fn internal_error() -> Self {
        Self::text(500, "Internal Server Error")
    }

    /// Replace the reason phrase. Line breaks are removed.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = strip_line_breaks(reason.into());
        self
    }

    /// Set a header, replacing any existing header with the same name.
    ///
    /// `Content-Length` is derived from the body and cannot be set here.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
            tracing::debug!("Ignoring explicit Content-Length header");
            return self;
        }
        self.set_header(name, value.into());
        self
    }

    /// Replace the body. `Content-Length` follows it.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        let len = self.body.len().to_string();
        self.set_header(CONTENT_LENGTH.to_string(), len);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    fn set_header(&mut self, name: String, value: String) {
        let name = strip_line_breaks(name);
        let value = strip_line_breaks(value);
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }
}

/// CR and LF would end the line early on the wire.
fn strip_line_breaks(text: String) -> String {
    if text.contains(['\r', '\n']) {
        text.replace(['\r', '\n'], "")
    } else {
        text
    }
}

/// Standard reason phrase for a status code.
pub fn canonical_reason(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}
