//! Data models for service storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::Id;

/// A user account
///
/// At least one of `username`/`email` is set before persistence; each is
/// globally unique among users that have it set. Follow sets and the
/// notification list live on the user record, as in the original document
/// model.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Id,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: String,
    pub salt: String,
    pub followed_bookmarks: Vec<Id>,
    pub followed_users: Vec<Id>,
    pub notifications: Vec<NotificationEntry>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user record with empty follow sets and notifications
    pub fn new(
        username: Option<String>,
        email: Option<String>,
        password_hash: String,
        salt: String,
    ) -> Self {
        Self {
            id: Id::generate(),
            username,
            email,
            password_hash,
            salt,
            followed_bookmarks: Vec::new(),
            followed_users: Vec::new(),
            notifications: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A bookmark: a titled, ordered, duplicate-free list of answer URLs
#[derive(Debug, Clone, Serialize)]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Immutable after creation
    pub creator_id: Id,
    /// Suppressed by the owner projection when answers are not needed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// A session token record
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque token value is the record's identity
    pub token: Id,
    pub user_id: Id,
    pub created_at: DateTime<Utc>,
}

/// A per-user notification entry, at most one per source bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEntry {
    #[serde(rename = "bookmarkId")]
    pub bookmark_id: Id,
    /// Denormalized display title, refreshed against the bookmark store
    /// at read time
    pub title: String,
    pub count: i64,
}

/// Outcome of an answer addition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The URL was genuinely inserted; notification fan-out is due
    Added,
    /// The URL was already present; no-op
    Duplicate,
}

/// A public comment
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(skip_serializing)]
    pub ip: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
