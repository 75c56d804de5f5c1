//! One-shot multipart form sender.
//!
//! # Design
//! `FormRequestSender` holds only a `SenderConfig`. Every call builds its own
//! `reqwest::Client`, issues exactly one request and drops the client before
//! returning, so no connection outlives the call on any exit path.
//!
//! The async `send` is the real implementation. `send_blocking` is a thin
//! adapter for hosts without an async calling convention: it drives `send` on
//! a private current-thread runtime. When the caller is already running inside
//! a tokio runtime, that private runtime is moved to a scoped helper thread so
//! the caller's runtime is never nested or starved of the thread it blocks.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::multipart::Form;
use tokio_util::sync::CancellationToken;

use crate::config::SenderConfig;
use crate::error::SendError;
use crate::http::FormRequest;

#[derive(Debug, Clone, Default)]
pub struct FormRequestSender {
    config: SenderConfig,
}

impl FormRequestSender {
    pub fn new(config: SenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Send `request` and return the full response body as text.
    ///
    /// The body is returned for every status code. The text is decoded with
    /// the charset declared in `Content-Type`, falling back to UTF-8.
    pub async fn send(&self, request: &FormRequest) -> Result<String, SendError> {
        let client = self.config.client()?;
        let outgoing = build_request(&client, request)?;

        tracing::debug!(
            method = %request.method,
            target = %log_target(outgoing.url()),
            headers = request.headers().len(),
            fields = request.fields().len(),
            "sending form request"
        );

        let response = client.execute(outgoing).await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "form response received");
        Ok(body)
    }

    /// Like `send`, but gives up with `SendError::Cancelled` as soon as
    /// `token` is cancelled. The in-flight connection is dropped.
    pub async fn send_with_cancel(
        &self,
        request: &FormRequest,
        token: CancellationToken,
    ) -> Result<String, SendError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("form request cancelled");
                Err(SendError::Cancelled)
            }
            result = self.send(request) => result,
        }
    }

    /// Blocking variant of `send` with the same inputs, output and failures.
    pub fn send_blocking(&self, request: &FormRequest) -> Result<String, SendError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on(request);
        }
        std::thread::scope(|scope| scope.spawn(|| self.block_on(request)).join())
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }

    fn block_on(&self, request: &FormRequest) -> Result<String, SendError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SendError::Runtime)?;
        runtime.block_on(self.send(request))
    }
}

/// Translate a `FormRequest` into a ready-to-execute `reqwest::Request`.
///
/// Headers are appended verbatim, except `Content-Type` and `Content-Length`:
/// those describe the multipart body and are always set from it, so a caller
/// value for either is dropped. Each field becomes a text part with no
/// filename and no per-part content type.
fn build_request(client: &reqwest::Client, request: &FormRequest) -> Result<reqwest::Request, SendError> {
    let mut builder = client.request(request.method.into(), request.url.as_str());
    for (name, value) in request.headers() {
        if is_body_header(name) {
            tracing::debug!(header = %name, "dropping caller header, multipart body defines it");
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    let form = request
        .fields()
        .iter()
        .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()));
    Ok(builder.multipart(form).build()?)
}

fn is_body_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) || name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str())
}

/// Scheme, host, port and path of `url`, without query or fragment.
fn log_target(url: &reqwest::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

/// Send one multipart form request using default configuration.
///
/// `method` is a selector: exactly `"POST"` issues POST, anything else GET.
pub async fn send<H, F, K, V>(url: &str, method: &str, headers: H, fields: F) -> Result<String, SendError>
where
    H: IntoIterator<Item = (K, V)>,
    F: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let request = FormRequest::from_parts(url, method, headers, fields);
    FormRequestSender::default().send(&request).await
}

/// Blocking counterpart of [`send`].
pub fn send_blocking<H, F, K, V>(url: &str, method: &str, headers: H, fields: F) -> Result<String, SendError>
where
    H: IntoIterator<Item = (K, V)>,
    F: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let request = FormRequest::from_parts(url, method, headers, fields);
    FormRequestSender::default().send_blocking(&request)
}
