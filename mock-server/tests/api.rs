use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, EchoedRequest};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- fixed bodies ---

#[tokio::test]
async fn hello_returns_hello() {
    let resp = app().oneshot(get("/hello")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.as_ref(), b"hello");
}

#[tokio::test]
async fn empty_returns_empty_body() {
    let resp = app().oneshot(get("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_method_headers_and_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header("X-Foo", "bar")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("a=1".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(echoed.method, "POST");
    assert_eq!(echoed.header("x-foo"), Some("bar"));
    assert_eq!(
        echoed.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(echoed.body, "a=1");
}

#[tokio::test]
async fn echo_accepts_get_without_body() {
    let resp = app().oneshot(get("/echo")).await.unwrap();

    let echoed: EchoedRequest = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(echoed.method, "GET");
    assert!(echoed.body.is_empty());
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code_and_reason() {
    let resp = app().oneshot(get("/status/404")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await.as_ref(), b"Not Found");
}

#[tokio::test]
async fn status_rejects_out_of_range_code() {
    let resp = app().oneshot(get("/status/1000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let resp = app().oneshot(get("/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
