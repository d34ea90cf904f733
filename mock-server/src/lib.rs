//! Test double for the HTTP adapters.
//!
//! # Design
//! `app()` is an axum router whose responses are fixed or echo the request
//! back as JSON, so integration tests can check what a transport put on the
//! wire after the server's HTTP parser has seen it. `capture` complements it
//! with a raw one-shot listener for byte-exact assertions on the request head.

pub mod capture;

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server received, as returned by `/echo`.
///
/// Header names are lowercase because the server normalizes them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoedRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl EchoedRequest {
    /// First value received for `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/empty", get(empty))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello() -> &'static str {
    "hello"
}

async fn empty() -> &'static str {
    ""
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoedRequest {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    Ok((status, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echoed() -> EchoedRequest {
        EchoedRequest {
            method: "POST".to_string(),
            headers: vec![
                ("content-type".to_string(), "text/plain".to_string()),
                ("x-foo".to_string(), "bar".to_string()),
            ],
            body: "a=1".to_string(),
        }
    }

    #[test]
    fn echoed_request_serializes_headers_as_pairs() {
        let json = serde_json::to_value(echoed()).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["headers"][1][0], "x-foo");
        assert_eq!(json["headers"][1][1], "bar");
        assert_eq!(json["body"], "a=1");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = echoed();
        assert_eq!(req.header("X-Foo"), Some("bar"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.header("content-length"), None);
    }
}
