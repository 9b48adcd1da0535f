//! Bookmark endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::id::Id;
use crate::state::AppState;
use crate::store::{
    AnswerOutcome, Bookmark, BookmarkStore, CommentStore, SessionStore, UserStore,
};

#[derive(Deserialize)]
pub struct CreateRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// POST /bookmark
pub async fn create<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Bookmark>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let title = req.title.as_deref().filter(|t| !t.is_empty());
    let (Some(title), Some(token)) = (title, req.token.as_deref()) else {
        return Err(ServiceError::IncompleteInput);
    };

    let creator_id = super::resolve_token(&state.sessions, token)?;

    let bookmark = Bookmark {
        id: Id::generate(),
        title: title.to_string(),
        description: req.description.filter(|d| !d.is_empty()),
        creator_id,
        answers: Some(Vec::new()),
        created_at: Utc::now(),
    };
    state.bookmarks.insert_bookmark(&bookmark)?;
    Ok(Json(bookmark))
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /bookmark?userId=
pub async fn bookmarks_by_owner<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Bookmark>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let user_id = super::parse_id(query.user_id.as_deref().unwrap_or(""))?;
    let bookmarks = state.bookmarks.bookmarks_of(&user_id, true)?;
    Ok(Json(bookmarks))
}

/// GET /bookmark/{bookmarkId}
pub async fn get_bookmark<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Path(bookmark_id): Path<String>,
) -> Result<Json<Bookmark>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let bookmark_id = super::parse_id(&bookmark_id)?;
    let bookmark = state
        .bookmarks
        .get_bookmark(&bookmark_id)?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(bookmark))
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub token: Option<String>,
    pub answer: Option<String>,
}

/// POST /bookmark/{bookmarkId}
pub async fn add_answer<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let bookmark_id = super::parse_id(&bookmark_id)?;
    let answer = req.answer.as_deref().filter(|a| !a.is_empty());
    let (Some(answer), Some(token)) = (answer, req.token.as_deref()) else {
        return Err(ServiceError::IncompleteInput);
    };

    let requester_id = super::resolve_token(&state.sessions, token)?;
    let outcome = state
        .bookmarks
        .add_answer(&bookmark_id, answer, &requester_id)?;

    // Only a genuine insertion fans out; a duplicate URL must not bump
    // follower counts a second time.
    if outcome == AnswerOutcome::Added {
        if let Some(bookmark) = state.bookmarks.get_bookmark(&bookmark_id)? {
            state.users.fan_out(&bookmark_id, &bookmark.title)?;
        }
    }

    Ok(Json(json!({})))
}

/// PUT /bookmark/{bookmarkId}
pub async fn remove_answer<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let bookmark_id = super::parse_id(&bookmark_id)?;
    let answer = req.answer.as_deref().filter(|a| !a.is_empty());
    let (Some(answer), Some(token)) = (answer, req.token.as_deref()) else {
        return Err(ServiceError::IncompleteInput);
    };

    let requester_id = super::resolve_token(&state.sessions, token)?;
    state
        .bookmarks
        .remove_answer(answer, &bookmark_id, &requester_id)?;
    Ok(Json(json!({})))
}

#[derive(Deserialize)]
pub struct RemoveRequest {
    pub token: Option<String>,
}

/// DELETE /bookmark/{bookmarkId}
pub async fn remove_bookmark<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<RemoveRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let bookmark_id = super::parse_id(&bookmark_id)?;
    let token = req.token.as_deref().ok_or(ServiceError::IncompleteInput)?;
    let requester_id = super::resolve_token(&state.sessions, token)?;
    state
        .bookmarks
        .delete_bookmark(&bookmark_id, &requester_id)?;
    Ok(Json(json!({})))
}
