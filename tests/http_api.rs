mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{ADMIN_KEY, account, harness, kst};
use kitchen_budget_api::routes::create_app;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    let h = harness(kst(2025, 8, 12, 10, 0), vec![account("A1", "9999", 100_000)]);
    create_app(h.state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, String, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn send_json(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Percent-encodes the handful of characters JSON payloads use in these tests.
fn query_escape(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '{' => "%7B".to_string(),
            '}' => "%7D".to_string(),
            '"' => "%22".to_string(),
            ':' => "%3A".to_string(),
            ',' => "%2C".to_string(),
            '[' => "%5B".to_string(),
            ']' => "%5D".to_string(),
            ' ' => "%20".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn login_returns_user_and_budget() {
    let app = app();
    let (status, body) = send_json(
        &app,
        post_json("/api/auth/login", json!({ "userId": "A1", "pin": "9999" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["user"]["userId"], "A1");
    assert_eq!(body["data"]["budget"]["remainingBudget"], 100_000);
    assert!(body["data"]["user"].get("pin").is_none());
}

#[tokio::test]
async fn wrong_pin_is_401_with_error_envelope() {
    let app = app();
    let (status, body) = send_json(
        &app,
        post_json("/api/auth/login", json!({ "userId": "A1", "pin": "1111" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"]["error"], "invalid_credentials");
    assert!(body["message"].as_str().unwrap().contains("4 attempt(s)"));
}

#[tokio::test]
async fn order_then_budget_then_overspend() {
    let app = app();
    let (status, body) = send_json(
        &app,
        post_json(
            "/api/orders",
            json!({ "userId": "A1", "items": [{ "name": "rice", "quantity": 2, "price": 20000 }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remainingBudget"], 60_000);
    assert_eq!(body["data"]["order"]["items"][0]["total"], 40_000);

    let (status, body) = send_json(&app, get("/api/budget/A1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["budget"]["monthlyTotal"], 40_000);

    let (status, body) = send_json(
        &app,
        post_json(
            "/api/orders",
            json!({ "userId": "A1", "items": [{ "name": "beef", "quantity": 1, "price": 70000 }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["error"], "budget_exceeded");
    assert!(body["message"].as_str().unwrap().contains("60000"));

    let (status, body) = send_json(&app, get("/api/orders?userId=A1&per_page=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["itemName"], "rice");
}

#[tokio::test]
async fn order_listing_needs_a_user() {
    let app = app();
    let (status, body) = send_json(&app, get("/api/orders")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], "validation");
}

#[tokio::test]
async fn unknown_budget_user_is_404() {
    let app = app();
    let (status, body) = send_json(&app, get("/api/budget/nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn admin_routes_need_the_key() {
    let app = app();
    let (status, _) = send_json(&app, get("/api/admin/orders")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/security/users/A1")
        .header("x-admin-key", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/security/users/A1")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remainingAttempts"], 5);
    assert_eq!(body["data"]["locked"], false);
}

#[tokio::test]
async fn forced_override_reset_over_http() {
    let app = app();
    let request = Request::builder()
        .method("PUT")
        .uri("/api/admin/accounts/A1/master-budget")
        .header("x-admin-key", ADMIN_KEY)
        .header("content-type", "application/json")
        .body(Body::from(r#"{"masterBudget":5000}"#))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["budget"]["totalBudget"], 5_000);

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/maintenance/reset-overrides")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "skipped");

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/maintenance/reset-overrides?force=true")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["resetCount"], 1);
}

#[tokio::test]
async fn exec_without_action_describes_the_service() {
    let app = app();
    let (status, body) = send_json(&app, get("/exec")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(
        body["data"]["actions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|a| *a == "getBudget")
    );
}

#[tokio::test]
async fn exec_wraps_jsonp() {
    let app = app();
    let data = query_escape(r#"{"userId":"A1","pin":"9999"}"#);
    let (status, content_type, body) = send(
        &app,
        get(&format!("/exec?action=login&data={data}&callback=handleLogin")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/javascript"));
    let text = String::from_utf8(body).unwrap();
    let inner = text
        .strip_prefix("handleLogin(")
        .and_then(|rest| rest.strip_suffix(");"))
        .expect("callback wrapper");
    let envelope: Value = serde_json::from_str(inner).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["data"]["user"]["userId"], "A1");
}

#[tokio::test]
async fn exec_errors_stay_in_the_envelope() {
    let app = app();
    let data = query_escape(
        r#"{"userId":"A1","items":[{"name":"beef","quantity":1,"price":200000}]}"#,
    );
    let (status, body) = send_json(&app, get(&format!("/exec?action=order&data={data}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"]["error"], "budget_exceeded");

    let (_, body) = send_json(&app, get("/exec?action=teleport")).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("teleport"));

    let data = query_escape(r#"{"userId":"A1"}"#);
    let (_, body) = send_json(&app, get(&format!("/exec?action=securityStatus&data={data}"))).await;
    assert_eq!(body["data"]["error"], "forbidden");

    let data = query_escape(&format!(r#"{{"userId":"A1","adminKey":"{ADMIN_KEY}"}}"#));
    let (_, body) = send_json(&app, get(&format!("/exec?action=securityStatus&data={data}"))).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["failedAttempts"], 0);
}

#[tokio::test]
async fn exec_rejects_unsafe_callbacks() {
    let app = app();
    let (status, body) = send_json(&app, get("/exec?callback=alert(document.cookie)")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid callback name");
}

#[tokio::test]
async fn unknown_paths_get_an_error_envelope() {
    let app = app();
    let (status, body) = send_json(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"]["error"], "not_found");
}
