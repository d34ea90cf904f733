//! Caller-supplied header lists and their normalized forms.
//!
//! # Design
//! A header list mixes two shapes: literal `"Key: Value"` lines and
//! name/value pairs. `HeaderEntry` keeps that distinction explicit so each
//! transport can decide how to render it:
//!
//! - the direct transport flattens entries into header lines
//!   (`flatten_headers`);
//! - the stream transport folds them into an ordered name-to-value mapping
//!   (`rationalize_headers`) and renders that mapping as a header block.

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// One entry of a caller-supplied header list.
///
/// Deserializes from either a JSON string (`Literal`) or a two-element
/// array (`Named`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderEntry {
    /// A complete header line such as `"Accept: text/html"`.
    Literal(String),
    /// A header name and its value.
    Named(String, String),
}

impl HeaderEntry {
    pub fn literal(line: impl Into<String>) -> Self {
        HeaderEntry::Literal(line.into())
    }

    pub fn named(key: impl Into<String>, value: impl Into<String>) -> Self {
        HeaderEntry::Named(key.into(), value.into())
    }
}

impl From<&str> for HeaderEntry {
    fn from(line: &str) -> Self {
        HeaderEntry::Literal(line.to_string())
    }
}

impl From<String> for HeaderEntry {
    fn from(line: String) -> Self {
        HeaderEntry::Literal(line)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for HeaderEntry {
    fn from((key, value): (K, V)) -> Self {
        HeaderEntry::Named(key.into(), value.into())
    }
}

/// Render every entry as a header line, preserving order.
///
/// Returns `None` for an empty list so callers can skip setting headers
/// altogether.
pub fn flatten_headers(headers: &[HeaderEntry]) -> Option<Vec<String>> {
    if headers.is_empty() {
        return None;
    }
    let lines = headers
        .iter()
        .map(|entry| match entry {
            HeaderEntry::Literal(line) => line.clone(),
            HeaderEntry::Named(key, value) => format!("{key}: {value}"),
        })
        .collect();
    Some(lines)
}

/// Split a header line on its first colon into a key and a trimmed value.
///
/// The key is kept verbatim. Fails when there is no colon or when either
/// side is empty.
pub fn parse_header_line(line: &str) -> Result<(String, String), AdapterError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| AdapterError::unparsable_header(line))?;
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(AdapterError::unparsable_header(line));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Insertion-ordered header mapping.
///
/// Keys are stored as given and replaced only on an exact match; lookups
/// through `contains_key_ignore_case` ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RationalizedHeaders {
    entries: Vec<(String, String)>,
}

impl RationalizedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`, overwriting the value in place if the exact key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key_ignore_case(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `"<key>: <value>\r\n"` for every entry, in mapping order.
    pub fn to_header_block(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{key}: {value}\r\n"))
            .collect()
    }
}

/// Fold a header list into a `RationalizedHeaders` mapping.
///
/// Literal lines go through `parse_header_line`; named entries keep their
/// key and have their value trimmed.
pub fn rationalize_headers(headers: &[HeaderEntry]) -> Result<RationalizedHeaders, AdapterError> {
    let mut rationalized = RationalizedHeaders::new();
    for entry in headers {
        match entry {
            HeaderEntry::Literal(line) => {
                let (key, value) = parse_header_line(line)?;
                rationalized.insert(key, value);
            }
            HeaderEntry::Named(key, value) => rationalized.insert(key.as_str(), value.trim()),
        }
    }
    Ok(rationalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_passes_literals_and_renders_named() {
        let headers = vec![
            HeaderEntry::literal("Accept: text/html"),
            HeaderEntry::named("X-Foo", "bar"),
            HeaderEntry::literal("X-Raw:no-space"),
        ];
        assert_eq!(
            flatten_headers(&headers).unwrap(),
            vec!["Accept: text/html", "X-Foo: bar", "X-Raw:no-space"]
        );
    }

    #[test]
    fn flatten_empty_list_is_none() {
        assert!(flatten_headers(&[]).is_none());
    }

    #[test]
    fn parse_extracts_key_and_trimmed_value() {
        let (key, value) = parse_header_line("Content-Length: 42\r\n").unwrap();
        assert_eq!(key, "Content-Length");
        assert_eq!(value, "42");
    }

    #[test]
    fn parse_splits_on_first_colon_only() {
        let (key, value) = parse_header_line("Referer: http://x.com:8080/").unwrap();
        assert_eq!(key, "Referer");
        assert_eq!(value, "http://x.com:8080/");
    }

    #[test]
    fn parse_rejects_empty_line() {
        assert!(matches!(parse_header_line(""), Err(AdapterError::HeaderParse(_))));
    }

    #[test]
    fn parse_rejects_missing_colon() {
        assert!(matches!(parse_header_line("foo"), Err(AdapterError::HeaderParse(_))));
    }

    #[test]
    fn parse_rejects_empty_key() {
        assert!(matches!(parse_header_line(": 42\r\n"), Err(AdapterError::HeaderParse(_))));
    }

    #[test]
    fn parse_rejects_empty_value() {
        assert!(matches!(
            parse_header_line("Content-Length:"),
            Err(AdapterError::HeaderParse(_))
        ));
        assert!(matches!(
            parse_header_line("Content-Length:   "),
            Err(AdapterError::HeaderParse(_))
        ));
    }

    #[test]
    fn key_matching_ignores_case() {
        let mut headers = RationalizedHeaders::new();
        headers.insert("Content-Length", "42");
        assert!(headers.contains_key_ignore_case("CoNtenT-LenGth"));
        assert!(headers.contains_key_ignore_case("content-length"));
    }

    #[test]
    fn key_matching_compares_whole_keys() {
        let mut headers = RationalizedHeaders::new();
        headers.insert("Content-type", "html/css");
        assert!(!headers.contains_key_ignore_case("CoNtenT-LenGth"));
        assert!(!headers.contains_key_ignore_case("Content"));
    }

    #[test]
    fn insert_replaces_exact_key_in_place() {
        let mut headers = RationalizedHeaders::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("A", "3");
        headers.insert("a", "4");
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2"), ("a", "4")]);
    }

    #[test]
    fn rationalize_mixes_literal_and_named_entries() {
        let headers = vec![
            HeaderEntry::literal("Accept: text/html "),
            HeaderEntry::named("X-Foo", "  bar  "),
        ];
        let rationalized = rationalize_headers(&headers).unwrap();
        assert_eq!(rationalized.get("Accept"), Some("text/html"));
        assert_eq!(rationalized.get("X-Foo"), Some("bar"));
        assert_eq!(rationalized.len(), 2);
    }

    #[test]
    fn rationalize_stops_at_first_bad_line() {
        let headers = vec![HeaderEntry::literal("Accept: */*"), HeaderEntry::literal("bogus")];
        let err = rationalize_headers(&headers).unwrap_err();
        assert_eq!(
            err,
            AdapterError::HeaderParse("the following header could not be parsed: bogus".to_string())
        );
    }

    #[test]
    fn header_block_follows_mapping_order() {
        let mut headers = RationalizedHeaders::new();
        headers.insert("X-Foo", "bar");
        headers.insert("Content-Length", "3");
        assert_eq!(headers.to_header_block(), "X-Foo: bar\r\nContent-Length: 3\r\n");
        assert_eq!(RationalizedHeaders::new().to_header_block(), "");
    }

    #[test]
    fn entries_deserialize_from_strings_and_pairs() {
        let entries: Vec<HeaderEntry> =
            serde_json::from_str(r#"["Accept: */*", ["X-Foo", "bar"]]"#).unwrap();
        assert_eq!(
            entries,
            vec![HeaderEntry::literal("Accept: */*"), HeaderEntry::named("X-Foo", "bar")]
        );
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(HeaderEntry::from("A: b"), HeaderEntry::literal("A: b"));
        assert_eq!(HeaderEntry::from(("A", "b")), HeaderEntry::named("A", "b"));
    }
}
