//! Public comment endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::id::Id;
use crate::state::AppState;
use crate::store::{BookmarkStore, Comment, CommentStore, SessionStore, UserStore};

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

/// POST /comment
pub async fn post_comment<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    headers: HeaderMap,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let content = req.content.filter(|c| !c.is_empty());
    let Some(content) = content else {
        return Err(ServiceError::IncompleteInput);
    };

    // The service sits behind a proxy; the forwarded address is all the
    // ledger records about the submitter.
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let comment = Comment {
        id: Id::generate(),
        ip,
        content,
        created_at: Utc::now(),
    };
    state.comments.insert_comment(&comment)?;
    Ok(Json(json!({})))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub start: Option<usize>,
    pub length: Option<usize>,
}

/// GET /comment?start=&length=
pub async fn list_comments<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Comment>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let start = query.start.unwrap_or(0);
    let length = query.length.unwrap_or(10);
    Ok(Json(state.comments.comments(start, length)?))
}
