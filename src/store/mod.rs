//! Storage abstractions for the service
//!
//! The persistent store is an explicitly constructed handle injected into
//! the application state, never process-wide state. Concurrency
//! correctness rests on each backend's atomicity guarantees: ownership-
//! gated mutations are single conditional updates whose filter encodes
//! both the target identity and the ownership predicate, and the
//! notification fan-out runs as one atomic batch.

pub mod models;

mod memory;
mod sqlite;

pub use memory::{
    InMemoryBookmarkStore, InMemoryCommentStore, InMemorySessionStore, InMemoryUserStore,
};
pub use models::*;
pub use sqlite::SqliteStore;

use std::collections::HashMap;

use crate::error::ServiceError;
use crate::id::Id;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ServiceError>;

/// Trait for user storage, the social graph, and the notification ledger
///
/// Follow edges and notification entries belong to the user record, so
/// they live behind the same trait as the user itself.
pub trait UserStore: Send + Sync {
    /// True if no existing user has this username set
    fn is_username_available(&self, username: &str) -> StoreResult<bool>;

    /// True if no existing user has this email set
    fn is_email_available(&self, email: &str) -> StoreResult<bool>;

    /// Insert a new user record
    ///
    /// The insert is the authority on uniqueness: a lost race against a
    /// concurrent registration surfaces as `Conflict` even when the
    /// advisory availability checks passed.
    fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Get a user by id
    fn get_user(&self, user_id: &Id) -> StoreResult<Option<User>>;

    /// Find a user whose username OR email equals `login`
    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>>;

    /// List all users
    fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Delete a user record; `NotFound` when no record was deleted
    fn delete_user(&self, user_id: &Id) -> StoreResult<()>;

    /// Add a bookmark to the user's followed set (idempotent)
    fn follow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()>;

    /// Remove a bookmark from the user's followed set (idempotent)
    fn unfollow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()>;

    /// Add another user to the user's followed set (idempotent)
    fn follow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()>;

    /// Remove another user from the user's followed set (idempotent)
    fn unfollow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()>;

    /// Ids of bookmarks the user follows
    fn followed_bookmarks(&self, user_id: &Id) -> StoreResult<Vec<Id>>;

    /// Users the user follows
    fn followed_users(&self, user_id: &Id) -> StoreResult<Vec<User>>;

    /// Fan out one answer addition on `bookmark_id` to its followers
    ///
    /// Runs the two-branch partition as one atomic batch: every user who
    /// already holds an entry for the bookmark gets its count incremented;
    /// every follower without an entry gets a fresh count-1 entry carrying
    /// the current title. No follower is skipped or double-counted.
    fn fan_out(&self, bookmark_id: &Id, title: &str) -> StoreResult<()>;

    /// The user's notification entries, in creation order
    fn notifications(&self, user_id: &Id) -> StoreResult<Vec<NotificationEntry>>;

    /// Acknowledge (delete) the entry for `bookmark_id`; idempotent
    fn remove_notification(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()>;
}

/// Trait for bookmark storage
pub trait BookmarkStore: Send + Sync {
    /// Insert a new bookmark record
    fn insert_bookmark(&self, bookmark: &Bookmark) -> StoreResult<()>;

    /// Get a bookmark by id, answers included
    fn get_bookmark(&self, bookmark_id: &Id) -> StoreResult<Option<Bookmark>>;

    /// Bookmarks created by `user_id`; `with_answers = false` suppresses
    /// the answer lists to keep payloads small
    fn bookmarks_of(&self, user_id: &Id, with_answers: bool) -> StoreResult<Vec<Bookmark>>;

    /// Current titles for a batch of bookmark ids (missing ids are absent)
    fn titles_of(&self, bookmark_ids: &[Id]) -> StoreResult<HashMap<Id, String>>;

    /// Add an answer URL, gated on `requester_id` owning the bookmark
    ///
    /// Ownership is encoded in the update's filter, not a separate read.
    /// A duplicate URL is a no-op reported as `Duplicate`, never an error;
    /// `Forbidden` when no owned bookmark matched.
    fn add_answer(
        &self,
        bookmark_id: &Id,
        answer: &str,
        requester_id: &Id,
    ) -> StoreResult<AnswerOutcome>;

    /// Remove an answer URL under the same ownership-via-filter pattern
    fn remove_answer(&self, answer: &str, bookmark_id: &Id, requester_id: &Id)
        -> StoreResult<()>;

    /// Delete a bookmark under the same ownership-via-filter pattern
    fn delete_bookmark(&self, bookmark_id: &Id, requester_id: &Id) -> StoreResult<()>;
}

/// Trait for session token storage
pub trait SessionStore: Send + Sync {
    /// Mint a fresh unguessable token bound to `user_id`
    fn issue(&self, user_id: &Id) -> StoreResult<Session>;

    /// Resolve a token to its owning user; `InvalidToken` when no record
    /// matches. Tokens do not expire.
    fn resolve(&self, token: &Id) -> StoreResult<Id>;

    /// Invalidate a single token
    fn revoke(&self, token: &Id) -> StoreResult<()>;

    /// Invalidate every token owned by `user_id`, returning the count
    fn revoke_user(&self, user_id: &Id) -> StoreResult<u64>;
}

/// Trait for public comment storage
pub trait CommentStore: Send + Sync {
    /// Insert a comment record
    fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;

    /// Page of comments in submission order
    fn comments(&self, start: usize, length: usize) -> StoreResult<Vec<Comment>>;
}
