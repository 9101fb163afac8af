//! Normalized inbound request.
//!
//! # Responsibilities
//! - Split the request target into a decoded path and query parameters
//! - Store lower-cased headers (last occurrence wins)
//! - Detect and decode JSON bodies
//! - Carry path parameters once the router has matched
//!
//! # Design Decisions
//! - No wire-format knowledge: the parser feeds a `RequestBuilder`
//! - Invalid JSON is not an error; `json()` is simply `None`
//! - Path parameters are set all at once by the dispatcher, never piecemeal

use std::collections::HashMap;

use serde_json::Value;
use url::Url;

/// A parsed HTTP request, immutable once built.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    raw_target: String,
    http_version: String,
    query_params: HashMap<String, Vec<String>>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    path_params: HashMap<String, String>,
    json: Option<Value>,
}

impl Request {
    /// Start building a request for `method` and a raw target such as `/users?name=ann`.
    pub fn builder(method: impl Into<String>, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method: method.into(),
            target: target.into(),
            http_version: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Percent-decoded path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request target exactly as it appeared on the request line.
    pub fn raw_target(&self) -> &str {
        &self.raw_target
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    pub fn query_params(&self) -> &HashMap<String, Vec<String>> {
        &self.query_params
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Headers keyed by lower-cased name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Decoded JSON body, present only for valid JSON sent as `application/json`.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub(crate) fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }
}

/// Collects the pieces of a request before normalization.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: String,
    target: String,
    http_version: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn http_version(mut self, version: impl Into<String>) -> Self {
        self.http_version = version.into();
        self
    }

    /// Add a header. Names are lower-cased and a repeated name replaces the earlier value.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        let (path, query_params) = split_target(&self.target);
        let json = detect_json(&self.headers, &self.body);

        Request {
            method: self.method,
            path,
            raw_target: self.target,
            http_version: self.http_version,
            query_params,
            headers: self.headers,
            body: self.body,
            path_params: HashMap::new(),
            json,
        }
    }
}

/// Split a request target into its decoded path and parsed query.
///
/// Absolute-form targets (`http://host/path?q`) are reduced to their path.
/// Query pairs with an empty value are dropped.
pub fn split_target(target: &str) -> (String, HashMap<String, Vec<String>>) {
    let (raw_path, raw_query) = if target.starts_with('/') {
        let target = target.split('#').next().unwrap_or_default();
        match target.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (target.to_string(), String::new()),
        }
    } else {
        match Url::parse(target) {
            Ok(url) => (url.path().to_string(), url.query().unwrap_or_default().to_string()),
            // Asterisk-form and other opaque targets
            Err(_) => (target.to_string(), String::new()),
        }
    };

    let decoded = urlencoding::decode_binary(raw_path.as_bytes());
    let path = String::from_utf8_lossy(&decoded).into_owned();

    let mut query_params: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        query_params
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    (path, query_params)
}

fn detect_json(headers: &HashMap<String, String>, body: &[u8]) -> Option<Value> {
    let is_json = headers
        .get("content-type")
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid JSON body received");
            None
        }
    }
}
