//! Follow/unfollow endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::PublicUser;
use crate::error::ServiceError;
use crate::id::Id;
use crate::state::AppState;
use crate::store::{BookmarkStore, CommentStore, SessionStore, UserStore};

#[derive(Deserialize)]
pub struct FollowBookmarkRequest {
    pub token: Option<String>,
    #[serde(rename = "bookmarkId")]
    pub bookmark_id: Option<String>,
}

#[derive(Deserialize)]
pub struct FollowUserRequest {
    pub token: Option<String>,
    #[serde(rename = "userId")]
    pub target_id: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

fn authed_pair<S: SessionStore>(
    sessions: &S,
    token: Option<&str>,
    id: Option<&str>,
) -> Result<(Id, Id), ServiceError> {
    let (Some(token), Some(id)) = (token, id) else {
        return Err(ServiceError::IncompleteInput);
    };
    let user_id = super::resolve_token(sessions, token)?;
    Ok((user_id, super::parse_id(id)?))
}

/// POST /follow/bookmark
pub async fn follow_bookmark<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<FollowBookmarkRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let (user_id, bookmark_id) = authed_pair(
        &state.sessions,
        req.token.as_deref(),
        req.bookmark_id.as_deref(),
    )?;
    state.users.follow_bookmark(&user_id, &bookmark_id)?;
    Ok(Json(json!({})))
}

/// DELETE /follow/bookmark
pub async fn unfollow_bookmark<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<FollowBookmarkRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let (user_id, bookmark_id) = authed_pair(
        &state.sessions,
        req.token.as_deref(),
        req.bookmark_id.as_deref(),
    )?;
    state.users.unfollow_bookmark(&user_id, &bookmark_id)?;
    Ok(Json(json!({})))
}

/// GET /follow/bookmark?token=
pub async fn followed_bookmarks<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Vec<Id>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let token = query.token.as_deref().ok_or(ServiceError::IncompleteInput)?;
    let user_id = super::resolve_token(&state.sessions, token)?;
    Ok(Json(state.users.followed_bookmarks(&user_id)?))
}

/// POST /follow/user
pub async fn follow_user<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<FollowUserRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let (user_id, target_id) = authed_pair(
        &state.sessions,
        req.token.as_deref(),
        req.target_id.as_deref(),
    )?;
    state.users.follow_user(&user_id, &target_id)?;
    Ok(Json(json!({})))
}

/// DELETE /follow/user
pub async fn unfollow_user<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<FollowUserRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let (user_id, target_id) = authed_pair(
        &state.sessions,
        req.token.as_deref(),
        req.target_id.as_deref(),
    )?;
    state.users.unfollow_user(&user_id, &target_id)?;
    Ok(Json(json!({})))
}

/// GET /follow/user?token=
pub async fn followed_users<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Vec<PublicUser>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let token = query.token.as_deref().ok_or(ServiceError::IncompleteInput)?;
    let user_id = super::resolve_token(&state.sessions, token)?;
    let users = state.users.followed_users(&user_id)?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}
