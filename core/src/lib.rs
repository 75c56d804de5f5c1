//! Multipart form-data sender for payment-processing APIs.
//!
//! # Overview
//! Sends one HTTP request with a `multipart/form-data` body built from string
//! fields and returns the raw response body as text. Status codes are not
//! interpreted: a 404 body comes back exactly like a 200 body. The only
//! failures are transport failures.
//!
//! # Design
//! - `FormRequest` is plain data: URL, method, headers, text fields.
//! - `FormRequestSender` is stateless apart from its `SenderConfig`; each call
//!   owns a fresh client and releases it before returning.
//! - The async path is the implementation; `send_blocking` adapts it for hosts
//!   that can only make blocking calls.
//! - Method selectors keep their historical meaning: exactly `"POST"` is POST,
//!   everything else is GET. `str::parse::<HttpMethod>()` is available for
//!   callers that want unknown selectors rejected instead.

pub mod config;
pub mod error;
pub mod http;
pub mod sender;

pub use config::SenderConfig;
pub use error::SendError;
pub use http::{FormRequest, HttpMethod};
pub use sender::{send, send_blocking, FormRequestSender};
pub use tokio_util::sync::CancellationToken;
