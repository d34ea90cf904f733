//! Error types shared by every transport.
//!
//! # Design
//! `HeaderParse` is kept apart from `Transport` because it is raised while
//! the request is still being built, before any socket is opened. Both carry
//! a human-readable message naming the failing operation or header.

use std::fmt;

/// Errors returned by `HttpAdapter` operations and adapter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The transport could not connect, send the request or read the body.
    Transport(String),

    /// A positional header line has no colon, an empty key or an empty value.
    HeaderParse(String),

    /// No transport is registered under the requested name.
    UnknownAdapter(String),

    /// The adapter configuration could not be read.
    Config(String),
}

impl AdapterError {
    pub(crate) fn unparsable_header(line: &str) -> Self {
        AdapterError::HeaderParse(format!("the following header could not be parsed: {line}"))
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::Transport(msg) => write!(f, "transport error: {msg}"),
            AdapterError::HeaderParse(msg) => write!(f, "header parse error: {msg}"),
            AdapterError::UnknownAdapter(name) => write!(f, "unknown http adapter: {name}"),
            AdapterError::Config(msg) => write!(f, "invalid adapter configuration: {msg}"),
        }
    }
}

impl std::error::Error for AdapterError {}
