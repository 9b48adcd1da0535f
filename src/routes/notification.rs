//! Notification endpoints (pull-only)

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::notify;
use crate::state::AppState;
use crate::store::{
    BookmarkStore, CommentStore, NotificationEntry, SessionStore, UserStore,
};

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// GET /notification?token=
pub async fn list<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Vec<NotificationEntry>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let token = query.token.as_deref().ok_or(ServiceError::IncompleteInput)?;
    let user_id = super::resolve_token(&state.sessions, token)?;
    let entries = notify::notifications_for(&state.users, &state.bookmarks, &user_id)?;
    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct AcknowledgeRequest {
    pub token: Option<String>,
    #[serde(rename = "bookmarkId")]
    pub bookmark_id: Option<String>,
}

/// DELETE /notification
pub async fn acknowledge<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<AcknowledgeRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let (Some(token), Some(bookmark_id)) = (req.token.as_deref(), req.bookmark_id.as_deref())
    else {
        return Err(ServiceError::IncompleteInput);
    };
    let user_id = super::resolve_token(&state.sessions, token)?;
    let bookmark_id = super::parse_id(bookmark_id)?;
    state.users.remove_notification(&user_id, &bookmark_id)?;
    Ok(Json(json!({})))
}
