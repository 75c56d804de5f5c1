//! Request descriptor types for a single multipart form exchange.
//!
//! # Design
//! `FormRequest` describes one request as plain data: URL, method, headers
//! and text fields. It is built by the caller, handed to
//! `FormRequestSender`, and consumed by that single call.
//!
//! Headers and fields are kept as ordered `(key, value)` lists rather than
//! hash maps so the multipart body lists parts in insertion order. Inserting a
//! key that is already present replaces its value in place, which keeps keys
//! unique without reordering.

use std::fmt;
use std::str::FromStr;

use crate::error::SendError;

/// HTTP method for a form request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Resolve a method selector the way the payment helper always has:
    /// exactly `"POST"` means POST, every other string means GET.
    ///
    /// The comparison is case-sensitive, so `"post"` and `"PUT"` both
    /// resolve to GET. Use `str::parse` for a strict alternative that
    /// rejects unknown selectors.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "POST" => HttpMethod::Post,
            "GET" => HttpMethod::Get,
            other => {
                tracing::debug!(selector = other, "unrecognised method selector, falling back to GET");
                HttpMethod::Get
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parsing: only `"GET"` and `"POST"` are accepted.
impl FromStr for HttpMethod {
    type Err = SendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(SendError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A multipart form request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub url: String,
    pub method: HttpMethod,
    headers: Vec<(String, String)>,
    fields: Vec<(String, String)>,
}

impl FormRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Build a request from a string method selector and key/value sources,
    /// matching the shape of the foreign-callable `send` entry point.
    pub fn from_parts<H, F, K, V>(url: impl Into<String>, selector: &str, headers: H, fields: F) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        F: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = FormRequest::new(url, HttpMethod::from_selector(selector));
        for (k, v) in headers {
            request.insert_header(k, v);
        }
        for (k, v) in fields {
            request.insert_field(k, v);
        }
        request
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_field(name, value);
        self
    }

    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        upsert(&mut self.headers, name.into(), value.into());
    }

    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        upsert(&mut self.fields, name.into(), value.into());
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}
