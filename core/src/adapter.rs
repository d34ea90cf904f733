//! The adapter contract and transport selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::TransportConfig;
use crate::direct::DirectTransport;
use crate::error::AdapterError;
use crate::headers::HeaderEntry;
use crate::stream::StreamTransport;

/// A synchronous HTTP transport.
///
/// Implementations hold no per-call state: each call builds its request,
/// executes it, releases whatever it opened and returns the raw body.
pub trait HttpAdapter: Send + Sync {
    /// Issue a GET and return the response body.
    fn fetch(&self, url: &str, headers: &[HeaderEntry]) -> Result<Vec<u8>, AdapterError>;

    /// Issue a POST carrying `body` and return the response body.
    fn submit(&self, url: &str, headers: &[HeaderEntry], body: &str)
        -> Result<Vec<u8>, AdapterError>;

    /// Stable lowercase identifier used to select this transport.
    fn name(&self) -> &'static str;
}

/// The transports this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[default]
    Direct,
    Stream,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Direct => DirectTransport::NAME,
            AdapterKind::Stream => StreamTransport::NAME,
        }
    }

    pub fn build(self, config: TransportConfig) -> Box<dyn HttpAdapter> {
        match self {
            AdapterKind::Direct => Box::new(DirectTransport::with_config(config)),
            AdapterKind::Stream => Box::new(StreamTransport::with_config(config)),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = AdapterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            DirectTransport::NAME => Ok(AdapterKind::Direct),
            StreamTransport::NAME => Ok(AdapterKind::Stream),
            other => Err(AdapterError::UnknownAdapter(other.to_string())),
        }
    }
}

/// Build the transport registered under `name` with default settings.
pub fn adapter_for_name(name: &str) -> Result<Box<dyn HttpAdapter>, AdapterError> {
    Ok(name.parse::<AdapterKind>()?.build(TransportConfig::default()))
}
