//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Inputs (`FfiPair`, the URL and method strings) are borrowed from the C
//! caller and copied before any work starts, so the caller may free them as
//! soon as a `formdata_*` function returns. Outputs (`FfiSendResult` and the
//! strings inside it) are heap-allocated here and owned by the caller until
//! passed to `formdata_free_result`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use formdata_core::{FormRequest, FormRequestSender, SendError};

/// Opaque handle to a `FormRequestSender`. C callers receive a pointer to
/// this and pass it back into the `formdata_sender_*` functions.
pub struct FfiSender {
    pub(crate) inner: FormRequestSender,
}

/// A borrowed key/value pair of NUL-terminated UTF-8 strings, used for both
/// headers and form fields.
#[repr(C)]
pub struct FfiPair {
    pub key: *const c_char,
    pub value: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of a send, as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// A required pointer argument was null.
    NullArg = 1,
    /// An argument was not valid UTF-8, or a config document was rejected.
    InvalidArg = 2,
    /// No response could be obtained (DNS, connect, reset, malformed URL).
    Transport = 3,
    /// A configured deadline expired.
    Timeout = 4,
    Cancelled = 5,
    /// The blocking adapter could not start its runtime.
    Runtime = 6,
    /// The response body contains a NUL byte and cannot be returned as a C string.
    InvalidBody = 7,
    Panic = 8,
}

/// Result envelope returned by every send function.
///
/// On `Ok`, `body` holds the response text (for any HTTP status) and
/// `error_message` is null. Otherwise `body` is null and `error_message`
/// describes the failure.
#[repr(C)]
pub struct FfiSendResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub body: *mut c_char,
}

impl FfiSendResult {
    pub(crate) fn ok(body: String) -> *mut Self {
        match CString::new(body) {
            Ok(body) => Self::boxed(FfiErrorCode::Ok, None, body.into_raw()),
            Err(e) => Self::error(
                FfiErrorCode::InvalidBody,
                format!("response body contains a NUL byte at offset {}", e.nul_position()),
            ),
        }
    }

    pub(crate) fn from_error(err: SendError) -> *mut Self {
        let code = match &err {
            e if e.is_timeout() => FfiErrorCode::Timeout,
            SendError::Transport(_) => FfiErrorCode::Transport,
            SendError::Cancelled => FfiErrorCode::Cancelled,
            SendError::Runtime(_) => FfiErrorCode::Runtime,
            SendError::UnsupportedMethod(_) => FfiErrorCode::InvalidArg,
        };
        Self::error(code, err.to_string())
    }

    pub(crate) fn from_arg_error(err: ArgError) -> *mut Self {
        Self::error(err.code, err.message)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }

    fn error(code: FfiErrorCode, message: String) -> *mut Self {
        Self::boxed(code, Some(message), std::ptr::null_mut())
    }

    fn boxed(code: FfiErrorCode, message: Option<String>, body: *mut c_char) -> *mut Self {
        let error_message = message.map_or(std::ptr::null_mut(), into_c_string);
        Box::into_raw(Box::new(FfiSendResult {
            error_code: code,
            error_message,
            body,
        }))
    }
}

/// Convert to a C string, replacing interior NULs so error text is never lost.
fn into_c_string(s: String) -> *mut c_char {
    let sanitized = if s.contains('\0') { s.replace('\0', "\u{FFFD}") } else { s };
    CString::new(sanitized).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

/// Rejected input, reported without touching the network.
#[derive(Debug)]
pub(crate) struct ArgError {
    pub(crate) code: FfiErrorCode,
    pub(crate) message: String,
}

impl ArgError {
    fn null(name: &str) -> Self {
        ArgError {
            code: FfiErrorCode::NullArg,
            message: format!("null argument: {name}"),
        }
    }
}

/// Copy a borrowed C string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str(ptr: *const c_char, name: &str) -> Result<String, ArgError> {
    if ptr.is_null() {
        return Err(ArgError::null(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_string)
        .map_err(|e| ArgError {
            code: FfiErrorCode::InvalidArg,
            message: format!("{name} is not valid UTF-8: {e}"),
        })
}

/// Copy `len` borrowed pairs. A null `pairs` is accepted only when `len` is 0.
///
/// # Safety
/// `pairs` must be null or point to `len` initialised `FfiPair` values whose
/// strings satisfy `read_str`.
pub(crate) unsafe fn read_pairs(pairs: *const FfiPair, len: u32, name: &str) -> Result<Vec<(String, String)>, ArgError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if pairs.is_null() {
        return Err(ArgError::null(name));
    }
    let slice = unsafe { std::slice::from_raw_parts(pairs, len as usize) };
    slice
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let key = unsafe { read_str(pair.key, &format!("{name}[{i}].key")) }?;
            let value = unsafe { read_str(pair.value, &format!("{name}[{i}].value")) }?;
            Ok((key, value))
        })
        .collect()
}

/// Decode every send argument into an owned `FormRequest`.
///
/// # Safety
/// Same requirements as `read_str` and `read_pairs` for each argument.
pub(crate) unsafe fn read_request(
    url: *const c_char,
    method: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    fields: *const FfiPair,
    fields_len: u32,
) -> Result<FormRequest, ArgError> {
    let url = unsafe { read_str(url, "url") }?;
    let method = unsafe { read_str(method, "method") }?;
    let headers = unsafe { read_pairs(headers, headers_len, "headers") }?;
    let fields = unsafe { read_pairs(fields, fields_len, "fields") }?;
    Ok(FormRequest::from_parts(url, &method, headers, fields))
}
