//! End-to-end tests driving the router with in-process requests.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parley_chats::{MessageService, RoomService};
use parley_config::{AuthConfig, DatabaseConfig};
use parley_database::{prepare_database, run_migrations};
use parley_users::UserService;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::broadcast;
use tower::ServiceExt;

use crate::gateway::{create_router, AppState};

async fn create_test_router() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        url: format!("sqlite:{}", db_path.display()),
        max_connections: 1,
    };

    let pool = prepare_database(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let auth = AuthConfig {
        secret_key: "test_secret_key_that_is_long_enough".to_string(),
        token_ttl_days: 7,
    };

    let (events, _) = broadcast::channel(16);
    let state = AppState {
        user_service: UserService::new(pool.clone(), &auth),
        room_service: RoomService::new(pool.clone(), events.clone()),
        message_service: MessageService::new(pool, events.clone()),
        events,
    };

    (create_router(state), temp_dir)
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/v1.0/register",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Sup3rSecret",
            "photo_url": null,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = create_test_router().await;

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_then_login() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/login",
        Some(json!({ "username": "alice", "password": "Sup3rSecret" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["token"].as_str().is_some());

    // The wire projection never carries credential material.
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/login",
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_round_trips_the_session_token() {
    let (app, _dir) = create_test_router().await;

    let token = register(&app, "alice").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/logout",
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/logout",
        Some(json!({ "token": "garbage" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/register",
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "Sup3rSecret",
            "photo_url": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_room_and_message_flow() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;
    register(&app, "bob").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/rooms",
        Some(json!({ "name": "lounge", "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "dialog");
    assert_eq!(body["members"], json!(["alice"]));

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/rooms/lounge/join",
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/message",
        Some(json!({ "roomname": "lounge", "username": "alice", "text": "hello bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomname"], "lounge");
    assert_eq!(body["username"], "alice");

    let message_id = body["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/v1.0/message/{message_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello bob");

    let (status, body) =
        send_json(&app, Method::GET, "/api/v1.0/message?room=lounge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Both members see the room under their contacts.
    let (status, body) =
        send_json(&app, Method::GET, "/api/v1.0/users/bob/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["lounge"]));
}

#[tokio::test]
async fn test_duplicate_room_conflicts() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/rooms",
        Some(json!({ "name": "lounge", "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/rooms",
        Some(json!({ "name": "lounge", "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_friends_endpoints() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;
    register(&app, "bob").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1.0/users/alice/friends/bob",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Symmetric: bob sees alice without acting himself.
    let (status, body) =
        send_json(&app, Method::GET, "/api/v1.0/users/bob/friends", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["alice"]));

    let (status, _) = send_json(
        &app,
        Method::DELETE,
        "/api/v1.0/users/alice/friends/bob",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send_json(&app, Method::GET, "/api/v1.0/users/bob/friends", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_missing_resources_are_404() {
    let (app, _dir) = create_test_router().await;

    let (status, _) = send_json(&app, Method::GET, "/api/v1.0/rooms/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, Method::GET, "/api/v1.0/message/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, Method::GET, "/api/v1.0/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_avatar_endpoint() {
    let (app, _dir) = create_test_router().await;

    register(&app, "alice").await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        "/api/v1.0/users/alice/avatar?s=64",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://www.gravatar.com/avatar/"));
    assert!(url.ends_with("&s=64"));
}
