//! bookmarkd
//!
//! A bookmarking/social web service: users register, authenticate via
//! opaque session tokens, collect answer URLs under titled bookmarks,
//! follow bookmarks and other users, and pull notifications when a
//! followed bookmark gains a new answer.

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod notify;
pub mod registry;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::ServiceError;
pub use id::Id;
pub use state::AppState;
pub use store::{
    BookmarkStore, CommentStore, InMemoryBookmarkStore, InMemoryCommentStore,
    InMemorySessionStore, InMemoryUserStore, SessionStore, SqliteStore, UserStore,
};
