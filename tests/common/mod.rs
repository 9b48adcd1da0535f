//! Common test utilities for service integration tests

use std::sync::Arc;

use axum_test::TestServer;
use bookmarkd::{
    routes, AppState, InMemoryBookmarkStore, InMemoryCommentStore, InMemorySessionStore,
    InMemoryUserStore,
};
use serde_json::{json, Value};

/// Create a test server over fresh in-memory stores
pub fn create_test_server() -> TestServer {
    let state = Arc::new(AppState::new(
        InMemoryUserStore::new(),
        InMemoryBookmarkStore::new(),
        InMemorySessionStore::new(),
        InMemoryCommentStore::new(),
    ));

    let app = routes::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Register a user, returning the assigned id
#[allow(dead_code)]
pub async fn register_user(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/user")
        .json(&json!({
            "username": username,
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["_id"].as_str().expect("No user id returned").to_string()
}

/// Log in, returning the session token
#[allow(dead_code)]
pub async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/login")
        .json(&json!({
            "username": username,
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["token"].as_str().expect("No token returned").to_string()
}

/// Create a bookmark, returning its id
#[allow(dead_code)]
pub async fn create_bookmark(server: &TestServer, token: &str, title: &str) -> String {
    let response = server
        .post("/bookmark")
        .json(&json!({
            "token": token,
            "title": title,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["_id"].as_str().expect("No bookmark id returned").to_string()
}
