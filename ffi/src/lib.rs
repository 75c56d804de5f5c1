//! C-ABI wrapper around `formdata-core`.
//!
//! # Overview
//! Exposes the multipart form sender through `extern "C"` functions so any
//! runtime with a C FFI (Python `ctypes`, .NET P/Invoke, ...) can send a
//! form request and get the raw response body back without linking to
//! Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `formdata_send` and `formdata_sender_send` block the calling thread.
//!   `formdata_sender_send_async` returns immediately and reports through a
//!   callback from a worker thread, for hosts that prefer not to block.
//! - A single `FfiSendResult` envelope carries either the body or an error
//!   code plus message. The caller owns it and must release it with
//!   `formdata_free_result`.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use formdata_core::{FormRequestSender, SenderConfig};

use types::*;

/// Completion callback for `formdata_sender_send_async`. Receives ownership of
/// the result and the caller's `user_data` pointer unchanged.
pub type FfiSendCallback = Option<extern "C" fn(result: *mut FfiSendResult, user_data: *mut c_void)>;

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

/// Library version. Free with `formdata_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Install a `tracing` subscriber that writes to stderr, filtered by
/// `RUST_LOG` (default `warn`). Returns false if a subscriber is already set.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Sender lifecycle
// ---------------------------------------------------------------------------

/// Create a sender from a JSON config document such as
/// `{"timeout_ms": 30000, "connect_timeout_ms": 5000}`.
///
/// A null `config_json` uses defaults (no timeout). Returns null if the
/// document is not valid UTF-8 or not a valid config.
/// The caller must free the returned pointer with `formdata_sender_free`.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_sender_new(config_json: *const c_char) -> *mut FfiSender {
    catch_unwind(|| {
        let config = if config_json.is_null() {
            SenderConfig::default()
        } else {
            let raw = match unsafe { CStr::from_ptr(config_json) }.to_str() {
                Ok(s) => s,
                Err(_) => return std::ptr::null_mut(),
            };
            match serde_json::from_str(raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("rejected sender config: {e}");
                    return std::ptr::null_mut();
                }
            }
        };
        Box::into_raw(Box::new(FfiSender {
            inner: FormRequestSender::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a sender created by `formdata_sender_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_sender_free(sender: *mut FfiSender) {
    if !sender.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(sender) });
        });
    }
}

// ---------------------------------------------------------------------------
// Send functions
// ---------------------------------------------------------------------------

/// Send a multipart form request with default configuration and block until
/// the whole response body has been read.
///
/// `method` is a selector: exactly `"POST"` issues POST, anything else GET.
/// `headers` / `fields` may be null when their length is 0. The body is
/// returned for every HTTP status; only transport failures are errors.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_send(
    url: *const c_char,
    method: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    fields: *const FfiPair,
    fields_len: u32,
) -> *mut FfiSendResult {
    catch_unwind(|| {
        send_with(
            &FormRequestSender::default(),
            url,
            method,
            headers,
            headers_len,
            fields,
            fields_len,
        )
    })
    .unwrap_or_else(|_| FfiSendResult::panic("panic in formdata_send"))
}

/// Same as `formdata_send`, using the configuration of `sender`.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_sender_send(
    sender: *const FfiSender,
    url: *const c_char,
    method: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    fields: *const FfiPair,
    fields_len: u32,
) -> *mut FfiSendResult {
    catch_unwind(|| {
        if sender.is_null() {
            return FfiSendResult::from_arg_error(ArgError {
                code: FfiErrorCode::NullArg,
                message: "null argument: sender".to_string(),
            });
        }
        let sender = unsafe { &*sender };
        send_with(&sender.inner, url, method, headers, headers_len, fields, fields_len)
    })
    .unwrap_or_else(|_| FfiSendResult::panic("panic in formdata_sender_send"))
}

/// Start a send on a worker thread and return immediately.
///
/// All arguments are copied before this function returns. On `Ok`, `callback`
/// is invoked exactly once, from the worker thread, with a result the callback
/// must release via `formdata_free_result`. On any other return code the
/// callback is never invoked.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_sender_send_async(
    sender: *const FfiSender,
    url: *const c_char,
    method: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    fields: *const FfiPair,
    fields_len: u32,
    callback: FfiSendCallback,
    user_data: *mut c_void,
) -> FfiErrorCode {
    catch_unwind(|| {
        if sender.is_null() {
            return FfiErrorCode::NullArg;
        }
        let Some(callback) = callback else {
            return FfiErrorCode::NullArg;
        };
        let request = match unsafe { read_request(url, method, headers, headers_len, fields, fields_len) } {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("rejected async send: {}", e.message);
                return e.code;
            }
        };
        let sender = unsafe { &*sender }.inner.clone();
        let user_data = UserData(user_data);

        let spawned = std::thread::Builder::new()
            .name("formdata-send".to_string())
            .spawn(move || {
                let user_data = user_data;
                let result = catch_unwind(AssertUnwindSafe(|| match sender.send_blocking(&request) {
                    Ok(body) => FfiSendResult::ok(body),
                    Err(e) => FfiSendResult::from_error(e),
                }))
                .unwrap_or_else(|_| FfiSendResult::panic("panic in formdata_sender_send_async"));
                callback(result, user_data.0);
            });
        match spawned {
            Ok(_) => FfiErrorCode::Ok,
            Err(e) => {
                tracing::warn!("failed to spawn send worker: {e}");
                FfiErrorCode::Runtime
            }
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Caller-supplied context. The C side is responsible for making whatever it
/// points to safe to use from the worker thread.
struct UserData(*mut c_void);

unsafe impl Send for UserData {}

fn send_with(
    sender: &FormRequestSender,
    url: *const c_char,
    method: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    fields: *const FfiPair,
    fields_len: u32,
) -> *mut FfiSendResult {
    let request = match unsafe { read_request(url, method, headers, headers_len, fields, fields_len) } {
        Ok(request) => request,
        Err(e) => return FfiSendResult::from_arg_error(e),
    };
    match sender.send_blocking(&request) {
        Ok(body) => FfiSendResult::ok(body),
        Err(e) => FfiSendResult::from_error(e),
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by any send function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_free_result(result: *mut FfiSendResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.body.is_null() {
            drop(unsafe { CString::from_raw(result.body) });
        }
    });
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formdata_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}
