//! Error types for the form sender.
//!
//! # Design
//! HTTP error statuses are not errors here: a 404 or 500 body is returned as
//! an ordinary result. Everything that stops a response from being obtained
//! (DNS, connect, TLS, reset, malformed URL, illegal header, deadline) lands in
//! `Transport` with the underlying `reqwest::Error` kept as the source.

use std::io;

/// Errors returned by `FormRequestSender`.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// No complete response could be obtained from the server.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired before the response completed.
    #[error("request cancelled")]
    Cancelled,

    /// The blocking adapter could not start its private runtime.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    /// Returned only by strict method parsing.
    #[error("unsupported HTTP method: {0:?}")]
    UnsupportedMethod(String),
}

impl SendError {
    /// True when the failure was a request or connect deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Transport(e) if e.is_timeout())
    }

    /// True for failures below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, SendError::Transport(_))
    }
}
