use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, EchoReport, API_OK_BODY, CP1251_GREETING};
use tower::ServiceExt;

const BOUNDARY: &str = "X-MOCK-BOUNDARY";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Hand-encode a text-only multipart body so the router sees exactly what a
/// form client would send.
fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn form_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart_body(fields))
        .unwrap()
}

// --- api ---

#[tokio::test]
async fn api_returns_canned_json() {
    let resp = app()
        .oneshot(form_request("POST", "/api", &[("amount", "100")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    assert_eq!(body_bytes(resp).await, API_OK_BODY.as_bytes());
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_headers_and_parts() {
    let mut req = form_request("POST", "/echo", &[("orderId", "6555214"), ("sum", "30")]);
    req.headers_mut()
        .insert(http::header::AUTHORIZATION, "Bearer t".parse().unwrap());

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let report: EchoReport = body_json(resp).await;
    assert_eq!(report.method, "POST");
    assert_eq!(report.header("authorization"), Some("Bearer t"));
    assert_eq!(report.parts.len(), 2);
    assert_eq!(report.parts[0].name.as_deref(), Some("orderId"));
    assert_eq!(report.parts[0].value, "6555214");
    assert!(report.parts[0].file_name.is_none());
    assert!(report.parts[0].content_type.is_none());
    assert_eq!(report.parts[1].name.as_deref(), Some("sum"));
    assert_eq!(report.parts[1].value, "30");
}

#[tokio::test]
async fn echo_accepts_get_with_form_body() {
    let resp = app()
        .oneshot(form_request("GET", "/echo", &[("shopId", "abc")]))
        .await
        .unwrap();

    let report: EchoReport = body_json(resp).await;
    assert_eq!(report.method, "GET");
    assert_eq!(report.parts.len(), 1);
    assert_eq!(report.parts[0].value, "abc");
}

#[tokio::test]
async fn echo_without_form_is_unsupported_media_type() {
    let resp = app()
        .oneshot(Request::builder().uri("/echo").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn echo_with_json_content_type_is_unsupported_media_type() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(multipart_body(&[("amount", "100")]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn echo_with_empty_form_reports_no_parts() {
    let resp = app().oneshot(form_request("POST", "/echo", &[])).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report: EchoReport = body_json(resp).await;
    assert!(report.parts.is_empty());
}

// --- status ---

#[tokio::test]
async fn status_uses_query_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/status/404?body=not%20found")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "not found".as_bytes());
}

#[tokio::test]
async fn status_defaults_to_reason_phrase() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/503").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, "Service Unavailable".as_bytes());
}

#[tokio::test]
async fn status_out_of_range_returns_400() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/42").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- misc ---

#[tokio::test]
async fn stall_waits_then_answers() {
    let resp = app()
        .oneshot(Request::builder().uri("/stall/10").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "late".as_bytes());
}

#[tokio::test]
async fn cp1251_declares_charset() {
    let resp = app()
        .oneshot(Request::builder().uri("/charset/cp1251").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "text/plain; charset=windows-1251"
    );
    assert_eq!(body_bytes(resp).await, CP1251_GREETING);
}

#[tokio::test]
async fn unknown_route_is_plain_not_found() {
    let resp = app()
        .oneshot(Request::builder().uri("/nowhere").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "not found".as_bytes());
}
