//! Tests for the notification ledger

mod common;

use common::{create_bookmark, create_test_server, login, register_user};
use serde_json::{json, Value};

async fn add_answer(server: &axum_test::TestServer, token: &str, bookmark_id: &str, url: &str) {
    let response = server
        .post(&format!("/bookmark/{bookmark_id}"))
        .json(&json!({ "token": token, "answer": url }))
        .await;
    assert_eq!(response.status_code(), 200);
}

async fn notifications(server: &axum_test::TestServer, token: &str) -> Value {
    let response = server
        .get("/notification")
        .add_query_param("token", token)
        .await;
    assert_eq!(response.status_code(), 200);
    response.json()
}

/// The core fan-out property: one entry per source, count tracks genuine
/// answer additions, acknowledgement clears it
#[tokio::test]
async fn test_fan_out_counts() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "carol", "pw3").await;
    let alice = login(&server, "alice", "pw1").await;
    let carol = login(&server, "carol", "pw3").await;

    let bookmark_id = create_bookmark(&server, &carol, "Title1").await;
    server
        .post("/follow/bookmark")
        .json(&json!({ "token": alice, "bookmarkId": bookmark_id }))
        .await;

    add_answer(&server, &carol, &bookmark_id, "http://a").await;
    let body = notifications(&server, &alice).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["bookmarkId"], bookmark_id.as_str());
    assert_eq!(body[0]["title"], "Title1");
    assert_eq!(body[0]["count"], 1);

    add_answer(&server, &carol, &bookmark_id, "http://b").await;
    let body = notifications(&server, &alice).await;
    assert_eq!(body[0]["count"], 2);

    let response = server
        .delete("/notification")
        .json(&json!({ "token": alice, "bookmarkId": bookmark_id }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = notifications(&server, &alice).await;
    assert_eq!(body, json!([]));

    // Acknowledging again is not an error
    let response = server
        .delete("/notification")
        .json(&json!({ "token": alice, "bookmarkId": bookmark_id }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// A duplicate answer URL must not bump follower counts
#[tokio::test]
async fn test_duplicate_answer_does_not_fan_out() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "carol", "pw3").await;
    let alice = login(&server, "alice", "pw1").await;
    let carol = login(&server, "carol", "pw3").await;

    let bookmark_id = create_bookmark(&server, &carol, "Title1").await;
    server
        .post("/follow/bookmark")
        .json(&json!({ "token": alice, "bookmarkId": bookmark_id }))
        .await;

    add_answer(&server, &carol, &bookmark_id, "http://a").await;
    add_answer(&server, &carol, &bookmark_id, "http://a").await;

    let body = notifications(&server, &alice).await;
    assert_eq!(body[0]["count"], 1);
}

/// Non-followers see nothing; a user with no notifications gets an
/// empty list, not an error
#[tokio::test]
async fn test_non_follower_gets_nothing() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "carol", "pw3").await;
    let alice = login(&server, "alice", "pw1").await;
    let carol = login(&server, "carol", "pw3").await;

    let bookmark_id = create_bookmark(&server, &carol, "Title1").await;
    add_answer(&server, &carol, &bookmark_id, "http://a").await;

    let body = notifications(&server, &alice).await;
    assert_eq!(body, json!([]));
}

/// A follower joining between answers starts at count 1 while earlier
/// followers keep counting
#[tokio::test]
async fn test_late_follower_partition() {
    let server = create_test_server();
    register_user(&server, "alice", "pw1").await;
    register_user(&server, "bob", "pw2").await;
    register_user(&server, "carol", "pw3").await;
    let alice = login(&server, "alice", "pw1").await;
    let bob = login(&server, "bob", "pw2").await;
    let carol = login(&server, "carol", "pw3").await;

    let bookmark_id = create_bookmark(&server, &carol, "Title1").await;
    server
        .post("/follow/bookmark")
        .json(&json!({ "token": alice, "bookmarkId": bookmark_id }))
        .await;
    add_answer(&server, &carol, &bookmark_id, "http://a").await;

    server
        .post("/follow/bookmark")
        .json(&json!({ "token": bob, "bookmarkId": bookmark_id }))
        .await;
    add_answer(&server, &carol, &bookmark_id, "http://b").await;

    let alice_body = notifications(&server, &alice).await;
    assert_eq!(alice_body[0]["count"], 2);
    let bob_body = notifications(&server, &bob).await;
    assert_eq!(bob_body[0]["count"], 1);
}
