use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, User};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// --- users ---

#[tokio::test]
async fn get_user_returns_json() {
    let resp = app().oneshot(get("/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).contains("application/json"));
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 1);
    assert_eq!(user.first_name, "Emily");
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get("/users/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "User with id '999' not found");
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/users/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- search ---

#[tokio::test]
async fn search_echoes_raw_query() {
    let resp = app().oneshot(get("/search?q=John&q=Jane")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "q=John&q=Jane");
}

#[tokio::test]
async fn search_without_query_is_empty() {
    let resp = app().oneshot(get("/search")).await.unwrap();
    assert_eq!(body_bytes(resp).await, "");
}

// --- headers ---

#[tokio::test]
async fn headers_are_echoed() {
    let req = Request::builder()
        .uri("/headers")
        .header("X-Id", "5")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let headers: serde_json::Value = body_json(resp).await;
    assert_eq!(headers["x-id"], "5");
}

// --- echo ---

#[tokio::test]
async fn echo_returns_body_and_content_type() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"a":1}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json");
    assert_eq!(body_bytes(resp).await, r#"{"a":1}"#);
}

#[tokio::test]
async fn echo_rejects_get() {
    let resp = app().oneshot(get("/echo")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- misc ---

#[tokio::test]
async fn slow_eventually_answers() {
    let resp = app().oneshot(get("/slow/10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "done");
}

#[tokio::test]
async fn broken_json_claims_json() {
    let resp = app().oneshot(get("/broken-json")).await.unwrap();
    assert_eq!(content_type(&resp), "application/json");
    assert_eq!(body_bytes(resp).await, "{not json");
}

#[tokio::test]
async fn unknown_route_is_plain_404() {
    let resp = app().oneshot(get("/potato")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&resp).starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "Not Found");
}
