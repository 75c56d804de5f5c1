//! Sender configuration.
//!
//! Durations are plain millisecond integers so a foreign caller can supply the
//! whole struct as JSON. Every field is optional and unset by default, which
//! leaves the HTTP client's own defaults in place (no request timeout).

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SenderConfig {
    /// Deadline for the whole exchange, from connect to the last body byte.
    pub timeout_ms: Option<u64>,
    /// Deadline for establishing the connection only.
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

impl SenderConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(saturating_millis(timeout));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Build a fresh client for one exchange.
    pub(crate) fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = self.timeout() {
            builder = builder.timeout(t);
        }
        if let Some(t) = self.connect_timeout() {
            builder = builder.connect_timeout(t);
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.as_str());
        }
        builder.build()
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
