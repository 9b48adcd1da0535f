//! Login endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::error::ServiceError;
use crate::registry;
use crate::state::AppState;
use crate::store::{BookmarkStore, CommentStore, SessionStore, UserStore};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub token: String,
}

/// GET /login
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

/// POST /login
pub async fn login<U, B, S, C>(
    State(state): State<Arc<AppState<U, B, S, C>>>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    let password = req.password.as_deref().unwrap_or("");
    let login = req
        .username
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(req.email.as_deref().filter(|s| !s.is_empty()));

    let (Some(login), false) = (login, password.is_empty()) else {
        return Err(ServiceError::IncompleteInput);
    };

    let (user_id, session) = registry::verify(&state.users, &state.sessions, login, password)?;

    set_login_cookie(&cookies, "userId", &user_id.to_string());
    set_login_cookie(&cookies, "login", session.token.as_str());

    Ok(Json(LoginResponse {
        user_id: user_id.to_string(),
        token: session.token.to_string(),
    }))
}

/// Long-lived cookie, matching the classic ten-year expiry
fn set_login_cookie(cookies: &Cookies, name: &'static str, value: &str) {
    let cookie = Cookie::build((name, value.to_string()))
        .path("/")
        .max_age(Duration::days(3650))
        .build();
    cookies.add(cookie);
}
