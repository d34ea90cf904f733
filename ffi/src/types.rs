//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Headers come in as an array of `FfiHeader` owned by the caller; a null
//! `key` marks a literal header line carried in `value`. Results go out as
//! a heap-allocated `FfiAdapterResult` the caller must hand back to
//! `http_adapter_free_result`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::str::Utf8Error;

use http_adapter_core::{AdapterError, HeaderEntry, HttpAdapter};

/// Opaque handle to a transport. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiHttpAdapter {
    pub(crate) inner: Box<dyn HttpAdapter>,
}

/// One header entry supplied by the caller.
///
/// With `key` null, `value` is a complete `"Key: Value"` line; otherwise
/// the pair is a named header.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Error codes returned in `FfiAdapterResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    HeaderParse = 2,
    UnknownAdapter = 3,
    InvalidConfig = 4,
    Panic = 5,
    NullArg = 6,
    InvalidUtf8 = 7,
}

/// Result envelope for `http_adapter_fetch` and `http_adapter_submit`.
///
/// On success `error_code` is `Ok`, `error_message` is null and
/// `body`/`body_len` hold the response body (`body` is null when the body
/// is empty). On failure `error_message` is a human-readable C string and
/// `body` is null.
#[repr(C)]
pub struct FfiAdapterResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiAdapterResult {
    pub(crate) fn ok_body(body: Vec<u8>) -> *mut Self {
        let body_len = body.len();
        let body = if body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(body.into_boxed_slice()) as *mut u8
        };
        Box::into_raw(Box::new(FfiAdapterResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            body,
            body_len,
        }))
    }

    pub(crate) fn from_error(err: AdapterError) -> *mut Self {
        let error_code = match &err {
            AdapterError::Transport(_) => FfiErrorCode::Transport,
            AdapterError::HeaderParse(_) => FfiErrorCode::HeaderParse,
            AdapterError::UnknownAdapter(_) => FfiErrorCode::UnknownAdapter,
            AdapterError::Config(_) => FfiErrorCode::InvalidConfig,
        };
        Self::failure(error_code, &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str, err: Utf8Error) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidUtf8, &format!("{name} is not UTF-8: {err}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiAdapterResult {
            error_code,
            error_message: to_c_string(msg),
            body: std::ptr::null_mut(),
            body_len: 0,
        }))
    }
}

/// Copy `s` into a C string owned by this library. Interior NULs yield an
/// empty string.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string as UTF-8.
///
/// # Safety
/// `ptr` must be non-null, NUL-terminated and outlive the returned slice.
pub(crate) unsafe fn borrow_str<'a>(ptr: *const c_char) -> Result<&'a str, Utf8Error> {
    unsafe { CStr::from_ptr(ptr) }.to_str()
}

/// Convert a caller-owned header array into core header entries.
///
/// # Safety
/// `headers` must point to `len` valid `FfiHeader` values when `len > 0`.
pub(crate) unsafe fn headers_from_ffi(
    headers: *const FfiHeader,
    len: u32,
) -> Result<Vec<HeaderEntry>, *mut FfiAdapterResult> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if headers.is_null() {
        return Err(FfiAdapterResult::null_arg("headers"));
    }
    let raw = unsafe { std::slice::from_raw_parts(headers, len as usize) };
    let mut entries = Vec::with_capacity(raw.len());
    for (i, header) in raw.iter().enumerate() {
        if header.value.is_null() {
            return Err(FfiAdapterResult::null_arg(&format!("headers[{i}].value")));
        }
        let value = unsafe { borrow_str(header.value) }
            .map_err(|e| FfiAdapterResult::invalid_utf8(&format!("headers[{i}].value"), e))?;
        let entry = if header.key.is_null() {
            HeaderEntry::literal(value)
        } else {
            let key = unsafe { borrow_str(header.key) }
                .map_err(|e| FfiAdapterResult::invalid_utf8(&format!("headers[{i}].key"), e))?;
            HeaderEntry::named(key, value)
        };
        entries.push(entry);
    }
    Ok(entries)
}
