//! Common functions used across test cases.

use axum::http::StatusCode;
use axum_test_helper::TestClient;
use tower::ServiceExt;

/// A client for a router over a freshly seeded database.
pub async fn client() -> TestClient {
    TestClient::new(tests_common::router::create_router().await)
}

/// GET a path and decode the JSON response.
pub async fn get(client: &TestClient, path: &str) -> (StatusCode, serde_json::Value) {
    let response = client.get(path).send().await;
    let status = response.status();
    (status, response.json().await)
}

/// The `data` rows of a successful list request.
pub async fn list(client: &TestClient, path: &str) -> Vec<serde_json::Value> {
    let (status, body) = get(client, path).await;
    assert_eq!(status, StatusCode::OK, "{path}: {body}");
    assert_eq!(body["errors"], serde_json::json!([]), "{path}");
    match body["data"].clone() {
        serde_json::Value::Array(rows) => rows,
        other => panic!("{path}: expected an array of rows, got {other}"),
    }
}

/// The errors of a rejected list request, which must carry no rows.
pub async fn list_errors(client: &TestClient, path: &str) -> Vec<String> {
    let (status, body) = get(client, path).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{path}: {body}");
    assert_eq!(body["data"], serde_json::json!([]), "{path}");
    serde_json::from_value(body["errors"].clone()).unwrap()
}

/// Pick one field out of every row.
pub fn column(rows: &[serde_json::Value], field: &str) -> Vec<serde_json::Value> {
    rows.iter().map(|row| row[field].clone()).collect()
}

/// Send a request straight to a router, optionally with a JSON body.
pub async fn send(
    router: axum::Router,
    method: axum::http::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let request = axum::http::Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json");
    let request = match body {
        Some(body) => request.body(axum::body::Body::from(body.to_string())),
        None => request.body(axum::body::Body::empty()),
    }
    .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
