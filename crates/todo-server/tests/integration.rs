use axum::http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use todo_core::auth::TokenIssuer;
use todo_core::config::Config;
use todo_server::{build_router, AppState};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "SecurePass123";

fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(
        b"integration-test-secret-0123456789",
        "todo-test",
        chrono::Duration::minutes(15),
        chrono::Duration::days(7),
    )
}

fn app() -> axum::Router {
    let conn = todo_core::db::open_db_in_memory().unwrap();
    build_router(AppState::new(conn, test_issuer()))
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            axum::body::Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => axum::body::Body::empty(),
    };
    let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

/// Sign up `email` and return (access_token, refresh_token).
async fn signup(app: &axum::Router, email: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/v1/auth/signup",
        None,
        json!({"email": email, "password": PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["refresh_token"].as_str().unwrap().to_string(),
    )
}

async fn create_task(app: &axum::Router, token: &str, title: &str) -> String {
    let (status, body) =
        post_json(app, "/api/v1/tasks", Some(token), json!({"title": title})).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

fn assert_error(body: &Value, error_type: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], error_type);
    assert!(body["message"].is_string());
}

// ---------------------------------------------------------------------------
// Health / fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_needs_no_auth() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "not_found");
}

#[tokio::test]
async fn wrong_method_uses_error_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/auth/signup", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error(&body, "method_not_allowed");

    let (token, _) = signup(&app, "mona@example.com").await;
    let (status, body) = send(&app, Method::PUT, "/api/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error(&body, "method_not_allowed");
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_returns_user_and_tokens() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/signup",
        None,
        json!({"email": "  Alice@Example.com ", "password": PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["expires_in"], 15 * 60);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = app();
    signup(&app, "dup@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/signup",
        None,
        json!({"email": "DUP@example.com", "password": PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, "conflict");
}

#[tokio::test]
async fn signup_validates_input() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/signup",
        None,
        json!({"email": "not-an-email", "password": PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "validation_error");

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/signup",
        None,
        json!({"email": "weak@example.com", "password": "short"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let app = app();
    signup(&app, "bob@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        json!({"email": "bob@example.com", "password": PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "bob@example.com");
    assert!(body["data"]["access_token"].is_string());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = app();
    signup(&app, "carol@example.com").await;

    let (wrong_status, wrong_body) = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        json!({"email": "carol@example.com", "password": "WrongPass999"}),
    )
    .await;
    let (unknown_status, unknown_body) = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        json!({"email": "nobody@example.com", "password": PASSWORD}),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_error(&wrong_body, "unauthorized");
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn refresh_issues_new_pair() {
    let app = app();
    let (_, refresh) = signup(&app, "dave@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        json!({"refresh_token": refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access_token"].as_str().unwrap();
    let (status, _) = get(&app, "/api/v1/tasks", access).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = app();
    let (access, _) = signup(&app, "erin@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        json!({"refresh_token": access}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "unauthorized");
}

#[tokio::test]
async fn me_returns_current_user() {
    let app = app();
    let (access, _) = signup(&app, "frank@example.com").await;
    let (status, body) = get(&app, "/api/v1/auth/me", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "frank@example.com");
}

// ---------------------------------------------------------------------------
// Bearer middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tasks_require_a_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "unauthorized");
}

#[tokio::test]
async fn garbage_and_refresh_tokens_are_rejected() {
    let app = app();
    let (_, refresh) = signup(&app, "gina@example.com").await;

    let (status, _) = get(&app, "/api/v1/tasks", "not.a.jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/v1/tasks", &refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let app = app();
    let forged = TokenIssuer::new(
        b"some-other-secret-entirely-987654",
        "todo-test",
        chrono::Duration::minutes(15),
        chrono::Duration::days(7),
    );
    let user = todo_core::user::User::new("h@example.com", "x");
    let pair = forged.issue_pair(&user).unwrap();
    let (status, _) = get(&app, "/api/v1/tasks", &pair.access_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_list_newest_first() {
    let app = app();
    let (token, _) = signup(&app, "ivan@example.com").await;

    let (status, body) = get(&app, "/api/v1/tasks", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = post_json(
        &app,
        "/api/v1/tasks",
        Some(&token),
        json!({"title": "  Buy milk  ", "description": "2 litres"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Buy milk");
    assert_eq!(body["data"]["description"], "2 litres");
    assert_eq!(body["data"]["completed"], false);

    create_task(&app, &token, "Walk dog").await;

    let (_, body) = get(&app, "/api/v1/tasks", &token).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Walk dog", "Buy milk"]);
}

#[tokio::test]
async fn create_rejects_bad_titles() {
    let app = app();
    let (token, _) = signup(&app, "judy@example.com").await;

    let (status, body) =
        post_json(&app, "/api/v1/tasks", Some(&token), json!({"title": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "validation_error");

    let (status, _) = post_json(
        &app,
        "/api/v1/tasks",
        Some(&token),
        json!({"title": "x".repeat(101)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/api/v1/tasks",
        Some(&token),
        json!({"title": "ok", "description": "d".repeat(501)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_envelope() {
    let app = app();
    let (token, _) = signup(&app, "kate@example.com").await;
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/tasks")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_error(&body, "validation_error");
}

#[tokio::test]
async fn tasks_are_invisible_to_other_users() {
    let app = app();
    let (alice, _) = signup(&app, "alice@example.com").await;
    let (bob, _) = signup(&app, "bob@example.com").await;
    let id = create_task(&app, &alice, "Alice's secret").await;

    let (_, body) = get(&app, "/api/v1/tasks", &bob).await;
    assert_eq!(body["data"], json!([]));

    let uri = format!("/api/v1/tasks/{id}");
    let (status, body) = get(&app, &uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "not_found");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&bob),
        Some(json!({"title": "pwned"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, &uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Alice's secret");
}

#[tokio::test]
async fn patch_and_put_update_partially() {
    let app = app();
    let (token, _) = signup(&app, "leo@example.com").await;
    let (_, body) = post_json(
        &app,
        "/api/v1/tasks",
        Some(&token),
        json!({"title": "Draft", "description": "keep me"}),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let created_at = body["data"]["created_at"].clone();
    let uri = format!("/api/v1/tasks/{id}");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"title": "Final"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["description"], "keep me");
    assert_eq!(body["data"]["created_at"], created_at);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["title"], "Final");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "validation_error");
}

#[tokio::test]
async fn complete_incomplete_and_filter() {
    let app = app();
    let (token, _) = signup(&app, "mia@example.com").await;
    let done = create_task(&app, &token, "Done one").await;
    create_task(&app, &token, "Open one").await;

    let (status, body) = post_json(
        &app,
        &format!("/api/v1/tasks/{done}/complete"),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], true);

    let (_, body) = get(&app, "/api/v1/tasks?status=completed", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Done one");

    let (_, body) = get(&app, "/api/v1/tasks?status=pending", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Open one");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/tasks/{done}/incomplete"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], false);

    let (status, body) = get(&app, "/api/v1/tasks?status=bogus", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "validation_error");
}

#[tokio::test]
async fn delete_removes_task() {
    let app = app();
    let (token, _) = signup(&app, "ned@example.com").await;
    let id = create_task(&app, &token, "Temporary").await;
    let uri = format!("/api/v1/tasks/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], Value::Null);

    let (status, _) = get(&app, &uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_uuid_task_id_is_not_found() {
    let app = app();
    let (token, _) = signup(&app, "olga@example.com").await;
    let (status, body) = get(&app, "/api/v1/tasks/12345", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "not_found");
}

// ---------------------------------------------------------------------------
// File-backed state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_survives_a_new_router_over_the_same_file() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.auth.jwt_secret = "file-backed-secret-0123456789abcdef".into();

    let first = build_router(AppState::from_config(dir.path(), &config, false).unwrap());
    let (token, _) = signup(&first, "pat@example.com").await;
    create_task(&first, &token, "Persisted").await;
    drop(first);

    let second = build_router(AppState::from_config(dir.path(), &config, false).unwrap());
    let (_, body) = get(&second, "/api/v1/tasks", &token).await;
    assert_eq!(body["data"][0]["title"], "Persisted");
    assert!(dir.path().join(".todo/todo.db").exists());
}
