//! Check header normalization against the JSON vectors in `test-vectors/`.
//!
//! Header lists are deserialized straight into `HeaderEntry` values: a JSON
//! string is a literal line, a two-element array is a named entry.

use http_adapter_core::headers::{flatten_headers, rationalize_headers};
use http_adapter_core::stream::rationalize_request_headers;
use http_adapter_core::{AdapterError, HeaderEntry, HttpMethod, RationalizedHeaders};

fn vectors() -> serde_json::Value {
    let raw = include_str!("../../test-vectors/headers.json");
    serde_json::from_str(raw).unwrap()
}

fn headers_of(case: &serde_json::Value) -> Vec<HeaderEntry> {
    serde_json::from_value(case["headers"].clone()).unwrap()
}

fn expected_pairs(case: &serde_json::Value) -> Vec<(String, String)> {
    serde_json::from_value(case["expected"].clone()).unwrap()
}

fn pairs(headers: &RationalizedHeaders) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Rationalize
// ---------------------------------------------------------------------------

#[test]
fn rationalize_vectors() {
    for case in vectors()["rationalize"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let rationalized = rationalize_headers(&headers_of(case)).unwrap();
        assert_eq!(pairs(&rationalized), expected_pairs(case), "{name}");
    }
}

#[test]
fn rationalize_error_vectors() {
    for case in vectors()["rationalize_errors"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let err = rationalize_headers(&headers_of(case)).unwrap_err();
        assert!(matches!(err, AdapterError::HeaderParse(_)), "{name}: {err:?}");
    }
}

// ---------------------------------------------------------------------------
// POST defaults
// ---------------------------------------------------------------------------

#[test]
fn post_default_vectors() {
    for case in vectors()["post_defaults"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();
        let rationalized =
            rationalize_request_headers(HttpMethod::Post, &headers_of(case), body).unwrap();
        assert_eq!(pairs(&rationalized), expected_pairs(case), "{name}");

        let get = rationalize_request_headers(HttpMethod::Get, &headers_of(case), body).unwrap();
        assert_eq!(get.len(), headers_of(case).len(), "{name}: GET adds nothing");
    }
}

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

#[test]
fn flatten_vectors() {
    for case in vectors()["flatten"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected: Option<Vec<String>> = serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(flatten_headers(&headers_of(case)), expected, "{name}");
    }
}
