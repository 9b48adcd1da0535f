//! Tests for bookmark CRUD and answer lists

mod common;

use common::{create_bookmark, create_test_server, login, register_user};
use serde_json::{json, Value};

/// The full lifecycle: register, login, create, answer, fetch, delete
#[tokio::test]
async fn test_bookmark_lifecycle() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    let token = login(&server, "alice", "pw1").await;

    let bookmark_id = create_bookmark(&server, &token, "Title1").await;

    let response = server
        .post(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": token, "answer": "http://x" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["title"], "Title1");
    assert_eq!(body["answers"], json!(["http://x"]));

    let response = server
        .delete(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    assert_eq!(response.status_code(), 404);
}

/// Empty title is rejected
#[tokio::test]
async fn test_empty_title_rejected() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    let token = login(&server, "alice", "pw1").await;

    let response = server
        .post("/bookmark")
        .json(&json!({ "token": token, "title": "" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

/// A non-owner cannot add answers, and the list stays unchanged
#[tokio::test]
async fn test_add_answer_requires_ownership() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "mallory", "pw2").await;
    let alice = login(&server, "alice", "pw1").await;
    let mallory = login(&server, "mallory", "pw2").await;

    let bookmark_id = create_bookmark(&server, &alice, "Title1").await;

    let response = server
        .post(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": mallory, "answer": "http://evil" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["answers"], json!([]));
}

/// Adding the same URL twice leaves exactly one occurrence
#[tokio::test]
async fn test_duplicate_answer_is_noop() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    let token = login(&server, "alice", "pw1").await;
    let bookmark_id = create_bookmark(&server, &token, "Title1").await;

    for _ in 0..2 {
        let response = server
            .post(&format!("/bookmark/{bookmark_id}"))
            .json(&json!({ "token": token, "answer": "http://x" }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["answers"], json!(["http://x"]));
}

/// Removing an answer, and ownership of the removal
#[tokio::test]
async fn test_remove_answer() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "mallory", "pw2").await;
    let alice = login(&server, "alice", "pw1").await;
    let mallory = login(&server, "mallory", "pw2").await;
    let bookmark_id = create_bookmark(&server, &alice, "Title1").await;

    server
        .post(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": alice, "answer": "http://x" }))
        .await;

    let response = server
        .put(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": mallory, "answer": "http://x" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .put(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": alice, "answer": "http://x" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["answers"], json!([]));
}

/// Deleting someone else's bookmark fails and leaves it in place
#[tokio::test]
async fn test_delete_requires_ownership() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "mallory", "pw2").await;
    let alice = login(&server, "alice", "pw1").await;
    let mallory = login(&server, "mallory", "pw2").await;
    let bookmark_id = create_bookmark(&server, &alice, "Title1").await;

    let response = server
        .delete(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": mallory }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server.get(&format!("/bookmark/{bookmark_id}")).await;
    assert_eq!(response.status_code(), 200);
}

/// The owner projection can suppress answer lists
#[tokio::test]
async fn test_owner_listing_projection() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "pw1").await;
    let token = login(&server, "alice", "pw1").await;
    let bookmark_id = create_bookmark(&server, &token, "Title1").await;
    server
        .post(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": token, "answer": "http://x" }))
        .await;

    let response = server.get(&format!("/user/{user_id}")).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body[0]["answers"], json!(["http://x"]));

    let response = server
        .get(&format!("/user/{user_id}"))
        .add_query_param("showAnswers", "0")
        .await;
    let body: Value = response.json();
    assert!(body[0].get("answers").is_none());
}

/// Malformed ids are rejected before reaching the core
#[tokio::test]
async fn test_malformed_id_rejected() {
    let server = create_test_server();

    let response = server.get("/bookmark/short").await;
    assert_eq!(response.status_code(), 409);

    let response = server.get("/user/not-a-hex-id-either-way").await;
    assert_eq!(response.status_code(), 409);
}
