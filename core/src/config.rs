//! Adapter configuration.
//!
//! # Design
//! Timeouts are fixed when a transport is constructed, never per call.
//! `AdapterConfig` is the serializable form a host application keeps in its
//! own settings; `TransportConfig` is what a transport actually holds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::{AdapterKind, HttpAdapter};
use crate::error::AdapterError;

/// Environment variable naming the transport (`direct` or `stream`).
pub const ADAPTER_ENV: &str = "HTTP_ADAPTER";
/// Environment variable holding the timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "HTTP_ADAPTER_TIMEOUT_SECS";

/// Construction-time settings shared by both transports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bound on connecting, sending and reading. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Which transport to build, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub adapter: AdapterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl AdapterConfig {
    /// Parse a JSON document such as `{"adapter": "stream", "timeout_secs": 5}`.
    pub fn from_json(raw: &str) -> Result<Self, AdapterError> {
        serde_json::from_str(raw).map_err(|e| AdapterError::Config(e.to_string()))
    }

    /// Read `HTTP_ADAPTER` and `HTTP_ADAPTER_TIMEOUT_SECS`; unset variables
    /// fall back to the defaults.
    pub fn from_env() -> Result<Self, AdapterError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AdapterError> {
        let adapter = match lookup(ADAPTER_ENV) {
            Some(name) => name.trim().parse()?,
            None => AdapterKind::default(),
        };
        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| AdapterError::Config(format!("{TIMEOUT_ENV}={raw}: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            adapter,
            timeout_secs,
        })
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn build(&self) -> Box<dyn HttpAdapter> {
        log::debug!(
            "building {} adapter (timeout: {:?}s)",
            self.adapter,
            self.timeout_secs
        );
        self.adapter.build(self.transport_config())
    }
}
