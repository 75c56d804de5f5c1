use std::time::Duration;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Canned body returned by `POST /api`.
pub const API_OK_BODY: &str = r#"{"ok":true}"#;

/// `Привет` encoded as windows-1251, served by `/charset/cp1251`.
pub const CP1251_GREETING: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];

/// Everything `/echo` observed about the incoming request. Requests without
/// a usable multipart body are answered with 415 instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoReport {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub parts: Vec<EchoPart>,
}

impl EchoReport {
    /// First value of header `name` (lower-case, as it arrives on the wire).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One multipart section as received.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub value: String,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub body: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/api", post(api))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/stall/{millis}", any(stall))
        .route("/charset/cp1251", any(cp1251))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn api() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], API_OK_BODY)
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EchoReport>, (StatusCode, String)> {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();

    let mut multipart = multipart.map_err(|e| (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.body_text()))?;
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let value = field
            .text()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        parts.push(EchoPart {
            name,
            file_name,
            content_type,
            value,
        });
    }

    Ok(Json(EchoReport {
        method: method.to_string(),
        headers,
        parts,
    }))
}

async fn status(Path(code): Path<u16>, Query(query): Query<StatusQuery>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let body = query
        .body
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
    Ok((status, body))
}

async fn stall(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "late"
}

async fn cp1251() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=windows-1251")], CP1251_GREETING)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_report_serializes_parts() {
        let report = EchoReport {
            method: "POST".to_string(),
            headers: vec![("authorization".to_string(), "Bearer t".to_string())],
            parts: vec![EchoPart {
                name: Some("amount".to_string()),
                file_name: None,
                content_type: None,
                value: "100".to_string(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["parts"][0]["name"], "amount");
        assert_eq!(json["parts"][0]["value"], "100");
        assert!(json["parts"][0]["file_name"].is_null());
    }

    #[test]
    fn header_lookup_returns_first_match() {
        let report = EchoReport {
            method: "GET".to_string(),
            headers: vec![
                ("accept".to_string(), "a".to_string()),
                ("accept".to_string(), "b".to_string()),
            ],
            parts: Vec::new(),
        };
        assert_eq!(report.header("accept"), Some("a"));
        assert_eq!(report.header("x-missing"), None);
    }

    #[test]
    fn status_query_body_is_optional() {
        let query: StatusQuery = serde_json::from_str("{}").unwrap();
        assert!(query.body.is_none());
    }
}
