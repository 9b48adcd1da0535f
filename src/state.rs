//! Application state

use crate::store::{BookmarkStore, CommentStore, SessionStore, UserStore};

/// Shared state: the injected store handles
///
/// All four slots may be backed by the same handle (the SQLite store) or
/// by independent in-memory stores in tests.
pub struct AppState<U, B, S, C>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    pub users: U,
    pub bookmarks: B,
    pub sessions: S,
    pub comments: C,
}

impl<U, B, S, C> AppState<U, B, S, C>
where
    U: UserStore,
    B: BookmarkStore,
    S: SessionStore,
    C: CommentStore,
{
    pub fn new(users: U, bookmarks: B, sessions: S, comments: C) -> Self {
        Self {
            users,
            bookmarks,
            sessions,
            comments,
        }
    }
}
