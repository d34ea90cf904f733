//! C-ABI wrapper around `http-adapter-core`.
//!
//! # Overview
//! Lets any language with a C FFI pick a transport by name and issue GET
//! and POST requests through it, getting the raw response body back.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Constructors return null on failure; request functions always return
//!   an `FfiAdapterResult` whose `error_code` says what happened.
//! - The C caller owns all returned pointers and must call the matching
//!   `http_adapter_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use http_adapter_core::{AdapterConfig, AdapterKind, TransportConfig};

use types::*;

// ---------------------------------------------------------------------------
// Adapter lifecycle
// ---------------------------------------------------------------------------

fn new_adapter(name: *const c_char, config: TransportConfig) -> *mut FfiHttpAdapter {
    if name.is_null() {
        return std::ptr::null_mut();
    }
    let kind = match unsafe { borrow_str(name) }.map(str::parse::<AdapterKind>) {
        Ok(Ok(kind)) => kind,
        Ok(Err(e)) => {
            log::debug!("http_adapter_new: {e}");
            return std::ptr::null_mut();
        }
        Err(_) => return std::ptr::null_mut(),
    };
    Box::into_raw(Box::new(FfiHttpAdapter {
        inner: kind.build(config),
    }))
}

/// Create the transport registered under `name` (`"direct"` or `"stream"`).
///
/// Returns null if `name` is null, not UTF-8 or unknown.
/// The caller must free the returned pointer with `http_adapter_free`.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_new(name: *const c_char) -> *mut FfiHttpAdapter {
    catch_unwind(|| new_adapter(name, TransportConfig::default())).unwrap_or(std::ptr::null_mut())
}

/// Like `http_adapter_new`, bounding connect, send and read by `timeout_ms`.
/// A timeout of 0 means no timeout.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_new_with_timeout(
    name: *const c_char,
    timeout_ms: u64,
) -> *mut FfiHttpAdapter {
    catch_unwind(|| {
        let config = match timeout_ms {
            0 => TransportConfig::default(),
            ms => TransportConfig::with_timeout(Duration::from_millis(ms)),
        };
        new_adapter(name, config)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a transport from a JSON configuration such as
/// `{"adapter": "stream", "timeout_secs": 5}`.
///
/// Returns null if `config_json` is null or cannot be parsed.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_from_config(config_json: *const c_char) -> *mut FfiHttpAdapter {
    catch_unwind(|| {
        if config_json.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(raw) = (unsafe { borrow_str(config_json) }) else {
            return std::ptr::null_mut();
        };
        match AdapterConfig::from_json(raw) {
            Ok(config) => Box::into_raw(Box::new(FfiHttpAdapter {
                inner: config.build(),
            })),
            Err(e) => {
                log::debug!("http_adapter_from_config: {e}");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an adapter created by any `http_adapter_new*` function. Safe to
/// call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_free(adapter: *mut FfiHttpAdapter) {
    if !adapter.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(adapter) });
        }));
    }
}

/// The adapter's name, e.g. `"stream"`.
///
/// Returns null if `adapter` is null. Free with `http_adapter_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_name(adapter: *const FfiHttpAdapter) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if adapter.is_null() {
            return std::ptr::null_mut();
        }
        let adapter = unsafe { &*adapter };
        to_c_string(adapter.inner.name())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Issue a GET for `url` with `headers_len` entries from `headers`.
///
/// `headers` may be null when `headers_len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_fetch(
    adapter: *const FfiHttpAdapter,
    url: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
) -> *mut FfiAdapterResult {
    catch_unwind(AssertUnwindSafe(|| {
        if adapter.is_null() {
            return FfiAdapterResult::null_arg("adapter");
        }
        if url.is_null() {
            return FfiAdapterResult::null_arg("url");
        }
        let adapter = unsafe { &*adapter };
        let url = match unsafe { borrow_str(url) } {
            Ok(url) => url,
            Err(e) => return FfiAdapterResult::invalid_utf8("url", e),
        };
        let headers = match unsafe { headers_from_ffi(headers, headers_len) } {
            Ok(headers) => headers,
            Err(result) => return result,
        };
        match adapter.inner.fetch(url, &headers) {
            Ok(body) => FfiAdapterResult::ok_body(body),
            Err(e) => FfiAdapterResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiAdapterResult::panic("panic in http_adapter_fetch"))
}

/// Issue a POST of `body` to `url`. A null `body` posts an empty body.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_submit(
    adapter: *const FfiHttpAdapter,
    url: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
    body: *const c_char,
) -> *mut FfiAdapterResult {
    catch_unwind(AssertUnwindSafe(|| {
        if adapter.is_null() {
            return FfiAdapterResult::null_arg("adapter");
        }
        if url.is_null() {
            return FfiAdapterResult::null_arg("url");
        }
        let adapter = unsafe { &*adapter };
        let url = match unsafe { borrow_str(url) } {
            Ok(url) => url,
            Err(e) => return FfiAdapterResult::invalid_utf8("url", e),
        };
        let body = if body.is_null() {
            ""
        } else {
            match unsafe { borrow_str(body) } {
                Ok(body) => body,
                Err(e) => return FfiAdapterResult::invalid_utf8("body", e),
            }
        };
        let headers = match unsafe { headers_from_ffi(headers, headers_len) } {
            Ok(headers) => headers,
            Err(result) => return result,
        };
        match adapter.inner.submit(url, &headers, body) {
            Ok(body) => FfiAdapterResult::ok_body(body),
            Err(e) => FfiAdapterResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiAdapterResult::panic("panic in http_adapter_submit"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiAdapterResult` returned by `http_adapter_fetch` or
/// `http_adapter_submit`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_free_result(result: *mut FfiAdapterResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.body.is_null() {
            let body = std::ptr::slice_from_raw_parts_mut(result.body, result.body_len);
            drop(unsafe { Box::from_raw(body) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_adapter_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
