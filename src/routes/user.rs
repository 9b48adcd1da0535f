//! User endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::registry;
use crate::state::AppState;
use crate::store::{Bookmark, BookmarkStore, CommentStore, SessionStore, User, UserStore};

/// A user as exposed over the wire: no hash, no salt
#[derive(Serialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /user
pub async fn register<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let user = registry::register(
        &state.users,
        req.username.as_deref(),
        req.email.as_deref(),
        req.password.as_deref().unwrap_or(""),
    )?;
    Ok(Json(PublicUser::from(&user)))
}

/// GET /user
pub async fn list_users<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
) -> Result<Json<Vec<PublicUser>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let users = state.users.list_users()?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[derive(Deserialize)]
pub struct BookmarksOfUserQuery {
    /// "0" suppresses the answer lists
    #[serde(rename = "showAnswers")]
    pub show_answers: Option<String>,
}

/// GET /user/{userId}
pub async fn bookmarks_of_user<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Path(user_id): Path<String>,
    Query(query): Query<BookmarksOfUserQuery>,
) -> Result<Json<Vec<Bookmark>>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let user_id = super::parse_id(&user_id)?;
    let with_answers = query.show_answers.as_deref() != Some("0");
    let bookmarks = state.bookmarks.bookmarks_of(&user_id, with_answers)?;
    Ok(Json(bookmarks))
}

#[derive(Deserialize)]
pub struct RemoveAccountRequest {
    pub token: Option<String>,
}

/// DELETE /user
pub async fn remove_account<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    Json(req): Json<RemoveAccountRequest>,
) -> Result<Json<Value>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let token = req.token.as_deref().ok_or(ServiceError::IncompleteInput)?;
    let user_id = super::resolve_token(&state.sessions, token)?;
    registry::remove(&state.users, &state.sessions, &user_id)?;
    Ok(Json(json!({})))
}
