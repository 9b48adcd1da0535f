//! Tests for user registration

mod common;

use common::{create_test_server, register_user};
use serde_json::{json, Value};

/// Registration returns the stored user with its assigned identity
#[tokio::test]
async fn test_register_returns_user_with_id() {
    let server = create_test_server();

    let response = server
        .post("/user")
        .json(&json!({
            "username": "alice",
            "password": "pw1",
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let id = body["_id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert_eq!(body["username"], "alice");
    // No credential material on the wire
    assert!(body.get("password_hash").is_none());
    assert!(body.get("salt").is_none());
}

/// Registering twice with the same username yields exactly one success
#[tokio::test]
async fn test_duplicate_username_rejected() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;

    let response = server
        .post("/user")
        .json(&json!({
            "username": "alice",
            "password": "other",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

/// Duplicate email is rejected even with a fresh username
#[tokio::test]
async fn test_duplicate_email_rejected() {
    let server = create_test_server();

    let response = server
        .post("/user")
        .json(&json!({ "email": "a@example.com", "password": "pw" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .post("/user")
        .json(&json!({
            "username": "bob",
            "email": "a@example.com",
            "password": "pw",
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Missing password or both identity fields is 409
#[tokio::test]
async fn test_incomplete_registration() {
    let server = create_test_server();

    let response = server
        .post("/user")
        .json(&json!({ "username": "alice" }))
        .await;
    assert_eq!(response.status_code(), 409);

    let response = server
        .post("/user")
        .json(&json!({ "password": "pw" }))
        .await;
    assert_eq!(response.status_code(), 409);

    // Empty strings count as absent
    let response = server
        .post("/user")
        .json(&json!({ "username": "", "email": "", "password": "pw" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

/// Users without an email never collide on the email uniqueness check
#[tokio::test]
async fn test_absent_email_does_not_constrain_uniqueness() {
    let server = create_test_server();
    register_user(&server, "alice", "pw").await;
    register_user(&server, "bob", "pw").await;

    let response = server.get("/user").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
}
