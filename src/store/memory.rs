//! In-memory storage implementations
//!
//! Used by tests and local development. Each mutation happens under a
//! single write-lock acquisition, which gives it the same atomicity the
//! SQLite backend gets from single statements and transactions.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::{
    AnswerOutcome, Bookmark, BookmarkStore, Comment, CommentStore, NotificationEntry, Session,
    SessionStore, StoreResult, User, UserStore,
};
use crate::error::ServiceError;
use crate::id::Id;

/// In-memory user store (users, follow sets, notification ledger)
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Id, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn is_username_available(&self, username: &str) -> StoreResult<bool> {
        let users = self.users.read().unwrap();
        Ok(!users
            .values()
            .any(|u| u.username.as_deref() == Some(username)))
    }

    fn is_email_available(&self, email: &str) -> StoreResult<bool> {
        let users = self.users.read().unwrap();
        Ok(!users.values().any(|u| u.email.as_deref() == Some(email)))
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        // The insert is the uniqueness authority; re-check under the
        // write lock so two racing registrations cannot both land.
        let clash = users.values().any(|u| {
            (user.username.is_some() && u.username == user.username)
                || (user.email.is_some() && u.email == user.email)
        });
        if clash {
            return Err(ServiceError::Conflict("unique constraint".into()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &Id) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(user_id).cloned())
    }

    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| u.username.as_deref() == Some(login) || u.email.as_deref() == Some(login))
            .cloned())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().unwrap();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    fn delete_user(&self, user_id: &Id) -> StoreResult<()> {
        // Known gap preserved: other users' follow edges and notification
        // entries referencing this user are left behind.
        match self.users.write().unwrap().remove(user_id) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound),
        }
    }

    fn follow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(ServiceError::NotFound)?;
        if !user.followed_bookmarks.contains(bookmark_id) {
            user.followed_bookmarks.push(bookmark_id.clone());
        }
        Ok(())
    }

    fn unfollow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(ServiceError::NotFound)?;
        user.followed_bookmarks.retain(|id| id != bookmark_id);
        Ok(())
    }

    fn follow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(ServiceError::NotFound)?;
        if !user.followed_users.contains(target_id) {
            user.followed_users.push(target_id.clone());
        }
        Ok(())
    }

    fn unfollow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(ServiceError::NotFound)?;
        user.followed_users.retain(|id| id != target_id);
        Ok(())
    }

    fn followed_bookmarks(&self, user_id: &Id) -> StoreResult<Vec<Id>> {
        let users = self.users.read().unwrap();
        let user = users.get(user_id).ok_or(ServiceError::NotFound)?;
        Ok(user.followed_bookmarks.clone())
    }

    fn followed_users(&self, user_id: &Id) -> StoreResult<Vec<User>> {
        let users = self.users.read().unwrap();
        let user = users.get(user_id).ok_or(ServiceError::NotFound)?;
        Ok(user
            .followed_users
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }

    fn fan_out(&self, bookmark_id: &Id, title: &str) -> StoreResult<()> {
        // One write-lock acquisition covers both branches, so no user can
        // be processed by both or transition between them mid-batch.
        let mut users = self.users.write().unwrap();
        for user in users.values_mut() {
            if let Some(entry) = user
                .notifications
                .iter_mut()
                .find(|n| &n.bookmark_id == bookmark_id)
            {
                entry.count += 1;
            } else if user.followed_bookmarks.contains(bookmark_id) {
                user.notifications.push(NotificationEntry {
                    bookmark_id: bookmark_id.clone(),
                    title: title.to_string(),
                    count: 1,
                });
            }
        }
        Ok(())
    }

    fn notifications(&self, user_id: &Id) -> StoreResult<Vec<NotificationEntry>> {
        let users = self.users.read().unwrap();
        let user = users.get(user_id).ok_or(ServiceError::NotFound)?;
        Ok(user.notifications.clone())
    }

    fn remove_notification(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(ServiceError::NotFound)?;
        user.notifications.retain(|n| &n.bookmark_id != bookmark_id);
        Ok(())
    }
}

/// In-memory bookmark store
#[derive(Default)]
pub struct InMemoryBookmarkStore {
    bookmarks: RwLock<HashMap<Id, Bookmark>>,
}

impl InMemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStore for InMemoryBookmarkStore {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> StoreResult<()> {
        self.bookmarks
            .write()
            .unwrap()
            .insert(bookmark.id.clone(), bookmark.clone());
        Ok(())
    }

    fn get_bookmark(&self, bookmark_id: &Id) -> StoreResult<Option<Bookmark>> {
        Ok(self.bookmarks.read().unwrap().get(bookmark_id).cloned())
    }

    fn bookmarks_of(&self, user_id: &Id, with_answers: bool) -> StoreResult<Vec<Bookmark>> {
        let bookmarks = self.bookmarks.read().unwrap();
        let mut owned: Vec<Bookmark> = bookmarks
            .values()
            .filter(|b| &b.creator_id == user_id)
            .cloned()
            .map(|mut b| {
                if !with_answers {
                    b.answers = None;
                }
                b
            })
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    fn titles_of(&self, bookmark_ids: &[Id]) -> StoreResult<HashMap<Id, String>> {
        let bookmarks = self.bookmarks.read().unwrap();
        Ok(bookmark_ids
            .iter()
            .filter_map(|id| bookmarks.get(id).map(|b| (id.clone(), b.title.clone())))
            .collect())
    }

    fn add_answer(
        &self,
        bookmark_id: &Id,
        answer: &str,
        requester_id: &Id,
    ) -> StoreResult<AnswerOutcome> {
        let mut bookmarks = self.bookmarks.write().unwrap();
        // Identity and ownership checked in the same locked mutation,
        // the in-memory shape of the conditional update.
        let bookmark = bookmarks
            .get_mut(bookmark_id)
            .filter(|b| &b.creator_id == requester_id)
            .ok_or(ServiceError::Forbidden)?;
        let answers = bookmark.answers.get_or_insert_with(Vec::new);
        if answers.iter().any(|a| a == answer) {
            return Ok(AnswerOutcome::Duplicate);
        }
        answers.push(answer.to_string());
        Ok(AnswerOutcome::Added)
    }

    fn remove_answer(
        &self,
        answer: &str,
        bookmark_id: &Id,
        requester_id: &Id,
    ) -> StoreResult<()> {
        let mut bookmarks = self.bookmarks.write().unwrap();
        let bookmark = bookmarks
            .get_mut(bookmark_id)
            .filter(|b| &b.creator_id == requester_id)
            .ok_or(ServiceError::Forbidden)?;
        if let Some(answers) = bookmark.answers.as_mut() {
            answers.retain(|a| a != answer);
        }
        Ok(())
    }

    fn delete_bookmark(&self, bookmark_id: &Id, requester_id: &Id) -> StoreResult<()> {
        let mut bookmarks = self.bookmarks.write().unwrap();
        let owned = bookmarks
            .get(bookmark_id)
            .is_some_and(|b| &b.creator_id == requester_id);
        if !owned {
            return Err(ServiceError::Forbidden);
        }
        bookmarks.remove(bookmark_id);
        Ok(())
    }
}

/// In-memory session token store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Id, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn issue(&self, user_id: &Id) -> StoreResult<Session> {
        let session = Session {
            token: Id::generate(),
            user_id: user_id.clone(),
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .unwrap()
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    fn resolve(&self, token: &Id) -> StoreResult<Id> {
        self.sessions
            .read()
            .unwrap()
            .get(token)
            .map(|s| s.user_id.clone())
            .ok_or(ServiceError::InvalidToken)
    }

    fn revoke(&self, token: &Id) -> StoreResult<()> {
        self.sessions.write().unwrap().remove(token);
        Ok(())
    }

    fn revoke_user(&self, user_id: &Id) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| &s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory comment store
#[derive(Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<Vec<Comment>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentStore for InMemoryCommentStore {
    fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        self.comments.write().unwrap().push(comment.clone());
        Ok(())
    }

    fn comments(&self, start: usize, length: usize) -> StoreResult<Vec<Comment>> {
        let comments = self.comments.read().unwrap();
        Ok(comments.iter().skip(start).take(length).cloned().collect())
    }
}
