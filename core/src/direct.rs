//! Connection-handle transport backed by a per-call `ureq::Agent`.
//!
//! # Design
//! The header list is flattened into plain header lines, then split into
//! name/value pairs for the backend. An empty list sets no headers at all.
//! The agent and the response it produces are locals of `execute`, so the
//! connection is released on every exit path.

use ureq::Agent;

use crate::adapter::HttpAdapter;
use crate::config::TransportConfig;
use crate::error::AdapterError;
use crate::headers::{flatten_headers, HeaderEntry};
use crate::http::{HttpMethod, HttpRequest};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Transport that hands each request to a fresh `ureq` agent.
///
/// Non-2xx responses are returned as bodies, not errors; only failures to
/// connect, send or read are reported.
#[derive(Debug, Clone, Default)]
pub struct DirectTransport {
    config: TransportConfig,
}

impl DirectTransport {
    pub const NAME: &'static str = "direct";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Built without ureq's `gzip` feature, so no `Accept-Encoding` is sent
    /// and bodies are returned undecoded.
    fn agent(&self) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(self.config.timeout)
            .build()
            .new_agent()
    }

    fn execute(&self, request: HttpRequest) -> Result<Vec<u8>, AdapterError> {
        let headers = backend_headers(&request)?;
        let operation = match request.method {
            HttpMethod::Get => "fetch",
            HttpMethod::Post => "post to",
        };
        let failed = |e: ureq::Error| {
            AdapterError::Transport(format!(
                "direct transport failed to {operation} {}: {e}",
                request.url
            ))
        };

        log::debug!(
            "direct {} {} with {} header(s)",
            request.method.as_str(),
            request.url,
            headers.len()
        );
        let agent = self.agent();
        let result = match &request.body {
            None => {
                let mut builder = agent.get(&request.url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Some(body) => {
                let mut builder = agent.post(&request.url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.as_bytes())
            }
        };
        let mut response = result.map_err(failed)?;
        log::debug!("direct {} {} -> {}", request.method.as_str(), request.url, response.status());

        response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(failed)
    }
}

impl HttpAdapter for DirectTransport {
    fn fetch(&self, url: &str, headers: &[HeaderEntry]) -> Result<Vec<u8>, AdapterError> {
        self.execute(HttpRequest::get(url, headers))
    }

    fn submit(
        &self,
        url: &str,
        headers: &[HeaderEntry],
        body: &str,
    ) -> Result<Vec<u8>, AdapterError> {
        self.execute(HttpRequest::post(url, headers, body))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Name/value pairs handed to the backend, in header-list order.
///
/// The backend only accepts headers as name/value pairs, so literal lines
/// are split on their first colon instead of being passed through whole. A
/// literal line without a colon cannot be expressed and is rejected with
/// `HeaderParse` before any I/O. curl would have sent such a line as-is, so
/// this is the one place where the direct transport is stricter.
///
/// A POST without a content type is sent as a form, the way posted fields
/// are by default.
fn backend_headers(request: &HttpRequest) -> Result<Vec<(String, String)>, AdapterError> {
    let mut pairs = Vec::new();
    if let Some(lines) = flatten_headers(&request.headers) {
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| AdapterError::unparsable_header(&line))?;
            pairs.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let has_content_type = pairs
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("Content-Type"));
    if request.method == HttpMethod::Post && !has_content_type {
        pairs.push(("Content-Type".to_string(), FORM_URLENCODED.to_string()));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_direct() {
        assert_eq!(DirectTransport::new().name(), "direct");
    }

    #[test]
    fn get_without_headers_sets_none() {
        let req = HttpRequest::get("example.com", &[]);
        assert!(backend_headers(&req).unwrap().is_empty());
    }

    #[test]
    fn literal_and_named_entries_become_pairs() {
        let req = HttpRequest::get(
            "example.com",
            &[HeaderEntry::literal("Accept:text/html"), HeaderEntry::named("X-Foo", "bar")],
        );
        assert_eq!(
            backend_headers(&req).unwrap(),
            vec![
                ("Accept".to_string(), "text/html".to_string()),
                ("X-Foo".to_string(), "bar".to_string()),
            ]
        );
    }

    #[test]
    fn literal_without_colon_is_rejected() {
        let req = HttpRequest::get("example.com", &[HeaderEntry::literal("foo")]);
        assert!(matches!(backend_headers(&req), Err(AdapterError::HeaderParse(_))));
    }

    #[test]
    fn post_defaults_content_type() {
        let req = HttpRequest::post("example.com", &[], "a=1");
        assert_eq!(
            backend_headers(&req).unwrap(),
            vec![("Content-Type".to_string(), FORM_URLENCODED.to_string())]
        );
    }

    #[test]
    fn post_keeps_explicit_content_type() {
        let req = HttpRequest::post(
            "example.com",
            &[HeaderEntry::named("content-type", "application/json")],
            "{}",
        );
        assert_eq!(
            backend_headers(&req).unwrap(),
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }
}
