//! Transport-agnostic HTTP client core.
//!
//! # Overview
//! One contract, `HttpAdapter`, for issuing GET and POST requests, with two
//! interchangeable transports behind it:
//!
//! - `DirectTransport` hands the request to a connection handle (`ureq`);
//! - `StreamTransport` writes its own HTTP/1.0 request over a socket stream.
//!
//! # Design
//! - Every call is synchronous and single-shot: build the request, execute
//!   it, release the handle, return the raw body or an `AdapterError`.
//! - Header lists mix literal lines and name/value pairs (`HeaderEntry`);
//!   each transport normalizes them its own way.
//! - Transports hold only construction-time settings (`TransportConfig`),
//!   so one instance can serve concurrent callers.
//! - Selecting a transport by name goes through `AdapterKind` /
//!   `AdapterConfig`.

pub mod adapter;
pub mod config;
pub mod direct;
pub mod error;
pub mod headers;
pub mod http;
pub mod stream;

pub use adapter::{adapter_for_name, AdapterKind, HttpAdapter};
pub use config::{AdapterConfig, TransportConfig};
pub use direct::DirectTransport;
pub use error::AdapterError;
pub use headers::{HeaderEntry, RationalizedHeaders};
pub use crate::http::{fix_url, HttpMethod, HttpRequest};
pub use stream::StreamTransport;
