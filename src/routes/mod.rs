//! HTTP routes for the service
//!
//! Thin transport layer: extract the session token from request body or
//! query, format-check opaque ids before they reach the core, and map
//! [`ServiceError`] kinds to status codes. Endpoints mirror the classic
//! Express surface of the service.

mod bookmark;
mod comment;
mod login;
mod notification;
mod social;
mod user;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::id::Id;
use crate::state::AppState;
use crate::store::{BookmarkStore, CommentStore, SessionStore, UserStore};

pub use user::PublicUser;

/// Create the router with all routes
pub fn create_router<U, B, S, C>(state: Arc<AppState<U, B, S, C>>) -> Router
where
    U: UserStore + 'static,
    B: BookmarkStore + 'static,
    S: SessionStore + 'static,
    C: CommentStore + 'static,
{
    Router::new()
        .route("/", get(index))
        .route(
            "/user",
            get(user::list_users)
                .post(user::register)
                .delete(user::remove_account),
        )
        .route("/user/{userId}", get(user::bookmarks_of_user))
        .route("/login", get(login::redirect_home).post(login::login))
        .route("/bookmark", get(bookmark::bookmarks_by_owner).post(bookmark::create))
        .route(
            "/bookmark/{bookmarkId}",
            get(bookmark::get_bookmark)
                .post(bookmark::add_answer)
                .put(bookmark::remove_answer)
                .delete(bookmark::remove_bookmark),
        )
        .route(
            "/follow/bookmark",
            get(social::followed_bookmarks)
                .post(social::follow_bookmark)
                .delete(social::unfollow_bookmark),
        )
        .route(
            "/follow/user",
            get(social::followed_users)
                .post(social::follow_user)
                .delete(social::unfollow_user),
        )
        .route(
            "/notification",
            get(notification::list).delete(notification::acknowledge),
        )
        .route(
            "/comment",
            get(comment::list_comments).post(comment::post_comment),
        )
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    "Hello world"
}

/// Format-check an id before it reaches the core
fn parse_id(value: &str) -> Result<Id, ServiceError> {
    value.parse().map_err(|_| ServiceError::IncompleteInput)
}

/// Resolve a request's session token to a user identity
fn resolve_token<S: SessionStore>(sessions: &S, token: &str) -> Result<Id, ServiceError> {
    let token: Id = token.parse().map_err(|_| ServiceError::InvalidToken)?;
    sessions.resolve(&token)
}
