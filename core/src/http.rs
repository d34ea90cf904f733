//! Per-call request descriptors.
//!
//! # Design
//! An `HttpRequest` is built fresh for every `fetch`/`submit` call and
//! dropped when the call returns. Its URL is always absolute: `fix_url`
//! runs on construction, so neither transport sees a scheme-less target.

use crate::headers::HeaderEntry;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One request, described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<HeaderEntry>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: &str, headers: &[HeaderEntry]) -> Self {
        Self {
            method: HttpMethod::Get,
            url: fix_url(url),
            headers: headers.to_vec(),
            body: None,
        }
    }

    pub fn post(url: &str, headers: &[HeaderEntry], body: &str) -> Self {
        Self {
            method: HttpMethod::Post,
            url: fix_url(url),
            headers: headers.to_vec(),
            body: Some(body.to_string()),
        }
    }
}

/// Prefix `http://` unless the URL already starts with `http://` or `https://`.
pub fn fix_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
