//! SQLite-based storage implementation
//!
//! One connection behind a mutex backs all four collections. Ownership-
//! gated mutations put the ownership predicate in the statement's WHERE
//! clause and decide success from the affected row count; the
//! notification fan-out runs inside a transaction.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    AnswerOutcome, Bookmark, BookmarkStore, Comment, CommentStore, NotificationEntry, Session,
    SessionStore, StoreResult, User, UserStore,
};
use crate::error::ServiceError;
use crate::id::Id;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing all four store traits
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ServiceError> {
        let conn = Connection::open(path).map_err(internal)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self, ServiceError> {
        let conn = Connection::open_in_memory().map_err(internal)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ServiceError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ServiceError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(internal)
    }

    /// Migration to version 1: initial schema
    ///
    /// UNIQUE constraints on username/email make the insert the authority
    /// on uniqueness; SQLite exempts NULLs, so absent values never
    /// constrain it. No ON DELETE CASCADE: deleting a user is known to
    /// leave bookmarks, follow edges, and notification entries behind.
    fn migrate_v1(conn: &Connection) -> Result<(), ServiceError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE,
                email TEXT UNIQUE,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Bookmarks
            CREATE TABLE IF NOT EXISTS bookmarks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                creator_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bookmarks_creator ON bookmarks(creator_id);

            -- Answer URLs, ordered by insertion, one row per (bookmark, url)
            CREATE TABLE IF NOT EXISTS answers (
                bookmark_id TEXT NOT NULL,
                url TEXT NOT NULL,
                UNIQUE (bookmark_id, url)
            );

            -- Follow edges
            CREATE TABLE IF NOT EXISTS follows_bookmarks (
                user_id TEXT NOT NULL,
                bookmark_id TEXT NOT NULL,
                UNIQUE (user_id, bookmark_id)
            );
            CREATE TABLE IF NOT EXISTS follows_users (
                user_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                UNIQUE (user_id, target_id)
            );

            -- Notification ledger, one entry per (user, source bookmark)
            CREATE TABLE IF NOT EXISTS notifications (
                user_id TEXT NOT NULL,
                bookmark_id TEXT NOT NULL,
                title TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 1,
                UNIQUE (user_id, bookmark_id)
            );

            -- Sessions
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

            -- Public comments
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                ip TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(internal)?;

        Ok(())
    }

    /// Load a user row and hydrate its follow sets and notifications
    fn load_user(conn: &Connection, user_id: &Id) -> StoreResult<Option<User>> {
        let row = conn
            .query_row(
                "SELECT id, username, email, password_hash, salt, created_at
                 FROM users WHERE id = ?1",
                params![user_id.as_str()],
                user_from_row,
            )
            .optional()
            .map_err(internal)?;

        let Some(mut user) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT bookmark_id FROM follows_bookmarks WHERE user_id = ?1 ORDER BY rowid")
            .map_err(internal)?;
        user.followed_bookmarks = stmt
            .query_map(params![user_id.as_str()], |row| {
                row.get::<_, String>(0).map(parse_id)
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;

        let mut stmt = conn
            .prepare("SELECT target_id FROM follows_users WHERE user_id = ?1 ORDER BY rowid")
            .map_err(internal)?;
        user.followed_users = stmt
            .query_map(params![user_id.as_str()], |row| {
                row.get::<_, String>(0).map(parse_id)
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;

        let mut stmt = conn
            .prepare(
                "SELECT bookmark_id, title, count FROM notifications
                 WHERE user_id = ?1 ORDER BY rowid",
            )
            .map_err(internal)?;
        user.notifications = stmt
            .query_map(params![user_id.as_str()], |row| {
                Ok(NotificationEntry {
                    bookmark_id: parse_id(row.get(0)?),
                    title: row.get(1)?,
                    count: row.get(2)?,
                })
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;

        Ok(Some(user))
    }

    fn load_bookmark(conn: &Connection, bookmark_id: &Id) -> StoreResult<Option<Bookmark>> {
        let row = conn
            .query_row(
                "SELECT id, title, description, creator_id, created_at
                 FROM bookmarks WHERE id = ?1",
                params![bookmark_id.as_str()],
                bookmark_from_row,
            )
            .optional()
            .map_err(internal)?;

        let Some(mut bookmark) = row else {
            return Ok(None);
        };

        bookmark.answers = Some(Self::load_answers(conn, bookmark_id)?);
        Ok(Some(bookmark))
    }

    fn load_answers(conn: &Connection, bookmark_id: &Id) -> StoreResult<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT url FROM answers WHERE bookmark_id = ?1 ORDER BY rowid")
            .map_err(internal)?;
        let rows = stmt
            .query_map(params![bookmark_id.as_str()], |row| row.get(0))
            .map_err(internal)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(internal);
        rows
    }

    fn user_exists(conn: &Connection, user_id: &Id) -> StoreResult<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(internal)
    }

    fn owns_bookmark(conn: &Connection, bookmark_id: &Id, user_id: &Id) -> StoreResult<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE id = ?1 AND creator_id = ?2)",
            params![bookmark_id.as_str(), user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(internal)
    }
}

fn internal(e: rusqlite::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}

/// Ids in the database were validated on the way in
fn parse_id(s: String) -> Id {
    s.parse().unwrap_or_else(|_| Id::generate())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_id(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        salt: row.get(4)?,
        followed_bookmarks: Vec::new(),
        followed_users: Vec::new(),
        notifications: Vec::new(),
        created_at: parse_datetime(row.get(5)?),
    })
}

fn bookmark_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: parse_id(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        creator_id: parse_id(row.get(3)?),
        answers: None,
        created_at: parse_datetime(row.get(4)?),
    })
}

impl UserStore for SqliteStore {
    fn is_username_available(&self, username: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let taken: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                params![username],
                |row| row.get(0),
            )
            .map_err(internal)?;
        Ok(!taken)
    }

    fn is_email_available(&self, email: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let taken: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
                params![email],
                |row| row.get(0),
            )
            .map_err(internal)?;
        Ok(!taken)
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.as_str(),
                user.username,
                user.email,
                user.password_hash,
                user.salt,
                user.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    // Availability pre-checks are advisory; a lost race
                    // lands here.
                    return ServiceError::Conflict("unique constraint".to_string());
                }
            }
            internal(e)
        })?;

        Ok(())
    }

    fn get_user(&self, user_id: &Id) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Self::load_user(&conn, user_id)
    }

    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user_id: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1 OR email = ?1",
                params![login],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;

        match user_id {
            Some(id) => Self::load_user(&conn, &parse_id(id)),
            None => Ok(None),
        }
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let ids: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT id FROM users ORDER BY rowid")
                .map_err(internal)?;
            let rows = stmt
                .query_map([], |row| row.get(0))
                .map_err(internal)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal);
            rows?
        };

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = Self::load_user(&conn, &parse_id(id))? {
                users.push(user);
            }
        }
        Ok(users)
    }

    fn delete_user(&self, user_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        // Existence signaled by the affected row count, not a pre-check
        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id.as_str()])
            .map_err(internal)?;

        if rows_affected == 0 {
            return Err(ServiceError::NotFound);
        }

        Ok(())
    }

    fn follow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        // Re-following an already-followed bookmark is a no-op success
        conn.execute(
            "INSERT OR IGNORE INTO follows_bookmarks (user_id, bookmark_id) VALUES (?1, ?2)",
            params![user_id.as_str(), bookmark_id.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn unfollow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        // Unfollowing something never followed still reports success:
        // the user record matched.
        conn.execute(
            "DELETE FROM follows_bookmarks WHERE user_id = ?1 AND bookmark_id = ?2",
            params![user_id.as_str(), bookmark_id.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn follow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        conn.execute(
            "INSERT OR IGNORE INTO follows_users (user_id, target_id) VALUES (?1, ?2)",
            params![user_id.as_str(), target_id.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn unfollow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        conn.execute(
            "DELETE FROM follows_users WHERE user_id = ?1 AND target_id = ?2",
            params![user_id.as_str(), target_id.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn followed_bookmarks(&self, user_id: &Id) -> StoreResult<Vec<Id>> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        let mut stmt = conn
            .prepare("SELECT bookmark_id FROM follows_bookmarks WHERE user_id = ?1 ORDER BY rowid")
            .map_err(internal)?;
        let rows = stmt
            .query_map(params![user_id.as_str()], |row| {
                row.get::<_, String>(0).map(parse_id)
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal);
        rows
    }

    fn followed_users(&self, user_id: &Id) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        let target_ids: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT target_id FROM follows_users WHERE user_id = ?1 ORDER BY rowid")
                .map_err(internal)?;
            let rows = stmt
                .query_map(params![user_id.as_str()], |row| row.get(0))
                .map_err(internal)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal);
            rows?
        };

        let mut users = Vec::with_capacity(target_ids.len());
        for id in target_ids {
            // Deleted users may leave dangling edges; skip them
            if let Some(user) = Self::load_user(&conn, &parse_id(id))? {
                users.push(user);
            }
        }
        Ok(users)
    }

    fn fan_out(&self, bookmark_id: &Id, title: &str) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(internal)?;

        // Branch 1: every user already holding an entry for this source
        // gets the count bumped, follower or not.
        tx.execute(
            "UPDATE notifications SET count = count + 1 WHERE bookmark_id = ?1",
            params![bookmark_id.as_str()],
        )
        .map_err(internal)?;

        // Branch 2: followers without an entry get a fresh count-1 entry.
        // The NOT EXISTS guard partitions the two branches so nobody is
        // double-counted.
        tx.execute(
            "INSERT INTO notifications (user_id, bookmark_id, title, count)
             SELECT f.user_id, ?1, ?2, 1 FROM follows_bookmarks f
             WHERE f.bookmark_id = ?1
               AND NOT EXISTS (SELECT 1 FROM notifications n
                               WHERE n.user_id = f.user_id AND n.bookmark_id = ?1)",
            params![bookmark_id.as_str(), title],
        )
        .map_err(internal)?;

        tx.commit().map_err(internal)?;
        Ok(())
    }

    fn notifications(&self, user_id: &Id) -> StoreResult<Vec<NotificationEntry>> {
        let conn = self.conn.lock().unwrap();
        if !Self::user_exists(&conn, user_id)? {
            return Err(ServiceError::NotFound);
        }
        let mut stmt = conn
            .prepare(
                "SELECT bookmark_id, title, count FROM notifications
                 WHERE user_id = ?1 ORDER BY rowid",
            )
            .map_err(internal)?;
        let rows = stmt
            .query_map(params![user_id.as_str()], |row| {
                Ok(NotificationEntry {
                    bookmark_id: parse_id(row.get(0)?),
                    title: row.get(1)?,
                    count: row.get(2)?,
                })
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal);
        rows
    }

    fn remove_notification(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        // Acknowledging a missing entry is not an error
        conn.execute(
            "DELETE FROM notifications WHERE user_id = ?1 AND bookmark_id = ?2",
            params![user_id.as_str(), bookmark_id.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }
}

impl BookmarkStore for SqliteStore {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO bookmarks (id, title, description, creator_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                bookmark.id.as_str(),
                bookmark.title,
                bookmark.description,
                bookmark.creator_id.as_str(),
                bookmark.created_at.to_rfc3339(),
            ],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn get_bookmark(&self, bookmark_id: &Id) -> StoreResult<Option<Bookmark>> {
        let conn = self.conn.lock().unwrap();
        Self::load_bookmark(&conn, bookmark_id)
    }

    fn bookmarks_of(&self, user_id: &Id, with_answers: bool) -> StoreResult<Vec<Bookmark>> {
        let conn = self.conn.lock().unwrap();
        let mut bookmarks = {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, description, creator_id, created_at
                     FROM bookmarks WHERE creator_id = ?1 ORDER BY rowid",
                )
                .map_err(internal)?;
            let rows = stmt
                .query_map(params![user_id.as_str()], bookmark_from_row)
                .map_err(internal)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal);
            rows?
        };

        if with_answers {
            for bookmark in &mut bookmarks {
                bookmark.answers = Some(Self::load_answers(&conn, &bookmark.id)?);
            }
        }
        Ok(bookmarks)
    }

    fn titles_of(&self, bookmark_ids: &[Id]) -> StoreResult<HashMap<Id, String>> {
        let conn = self.conn.lock().unwrap();
        let mut titles = HashMap::with_capacity(bookmark_ids.len());
        let mut stmt = conn
            .prepare("SELECT title FROM bookmarks WHERE id = ?1")
            .map_err(internal)?;
        for id in bookmark_ids {
            let title: Option<String> = stmt
                .query_row(params![id.as_str()], |row| row.get(0))
                .optional()
                .map_err(internal)?;
            if let Some(title) = title {
                titles.insert(id.clone(), title);
            }
        }
        Ok(titles)
    }

    fn add_answer(
        &self,
        bookmark_id: &Id,
        answer: &str,
        requester_id: &Id,
    ) -> StoreResult<AnswerOutcome> {
        let conn = self.conn.lock().unwrap();

        // Conditional update: identity, ownership, and set membership all
        // live in the statement's filter.
        let rows_affected = conn
            .execute(
                "INSERT INTO answers (bookmark_id, url)
                 SELECT ?1, ?2
                 WHERE EXISTS (SELECT 1 FROM bookmarks
                               WHERE id = ?1 AND creator_id = ?3)
                   AND NOT EXISTS (SELECT 1 FROM answers
                                   WHERE bookmark_id = ?1 AND url = ?2)",
                params![bookmark_id.as_str(), answer, requester_id.as_str()],
            )
            .map_err(internal)?;

        if rows_affected == 1 {
            return Ok(AnswerOutcome::Added);
        }

        // Zero rows: either a duplicate URL (no-op) or no owned bookmark.
        // The connection mutex is still held, so this read cannot race
        // the statement above.
        if Self::owns_bookmark(&conn, bookmark_id, requester_id)? {
            Ok(AnswerOutcome::Duplicate)
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    fn remove_answer(
        &self,
        answer: &str,
        bookmark_id: &Id,
        requester_id: &Id,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "DELETE FROM answers
                 WHERE bookmark_id = ?1 AND url = ?2
                   AND EXISTS (SELECT 1 FROM bookmarks
                               WHERE id = ?1 AND creator_id = ?3)",
                params![bookmark_id.as_str(), answer, requester_id.as_str()],
            )
            .map_err(internal)?;

        if rows_affected == 0 {
            // Removing an absent answer from an owned bookmark matched
            // the bookmark record, so it is a success.
            if !Self::owns_bookmark(&conn, bookmark_id, requester_id)? {
                return Err(ServiceError::Forbidden);
            }
        }
        Ok(())
    }

    fn delete_bookmark(&self, bookmark_id: &Id, requester_id: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND creator_id = ?2",
                params![bookmark_id.as_str(), requester_id.as_str()],
            )
            .map_err(internal)?;

        if rows_affected == 0 {
            return Err(ServiceError::Forbidden);
        }

        // Answers are part of the bookmark entity; follow edges and
        // notification entries pointing here are knowingly left behind.
        conn.execute(
            "DELETE FROM answers WHERE bookmark_id = ?1",
            params![bookmark_id.as_str()],
        )
        .map_err(internal)?;

        Ok(())
    }
}

impl SessionStore for SqliteStore {
    fn issue(&self, user_id: &Id) -> StoreResult<Session> {
        let conn = self.conn.lock().unwrap();
        let session = Session {
            token: Id::generate(),
            user_id: user_id.clone(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.token.as_str(),
                session.user_id.as_str(),
                session.created_at.to_rfc3339(),
            ],
        )
        .map_err(internal)?;

        Ok(session)
    }

    fn resolve(&self, token: &Id) -> StoreResult<Id> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT user_id FROM sessions WHERE token = ?1",
            params![token.as_str()],
            |row| row.get::<_, String>(0).map(parse_id),
        )
        .optional()
        .map_err(internal)?
        .ok_or(ServiceError::InvalidToken)
    }

    fn revoke(&self, token: &Id) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM sessions WHERE token = ?1",
            params![token.as_str()],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn revoke_user(&self, user_id: &Id) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE user_id = ?1",
                params![user_id.as_str()],
            )
            .map_err(internal)?;
        Ok(rows_affected as u64)
    }
}

impl CommentStore for SqliteStore {
    fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO comments (id, ip, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                comment.id.as_str(),
                comment.ip,
                comment.content,
                comment.created_at.to_rfc3339(),
            ],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn comments(&self, start: usize, length: usize) -> StoreResult<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, ip, content, created_at FROM comments
                 ORDER BY rowid LIMIT ?1 OFFSET ?2",
            )
            .map_err(internal)?;
        let rows = stmt
            .query_map(params![length as i64, start as i64], |row| {
                Ok(Comment {
                    id: parse_id(row.get(0)?),
                    ip: row.get(1)?,
                    content: row.get(2)?,
                    created_at: parse_datetime(row.get(3)?),
                })
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal);
        rows
    }
}

// Trait impls for Arc<SqliteStore> so one handle can back every store slot
// in the application state.
impl UserStore for std::sync::Arc<SqliteStore> {
    fn is_username_available(&self, username: &str) -> StoreResult<bool> {
        (**self).is_username_available(username)
    }

    fn is_email_available(&self, email: &str) -> StoreResult<bool> {
        (**self).is_email_available(email)
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        (**self).insert_user(user)
    }

    fn get_user(&self, user_id: &Id) -> StoreResult<Option<User>> {
        (**self).get_user(user_id)
    }

    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        (**self).find_by_login(login)
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        (**self).list_users()
    }

    fn delete_user(&self, user_id: &Id) -> StoreResult<()> {
        (**self).delete_user(user_id)
    }

    fn follow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        (**self).follow_bookmark(user_id, bookmark_id)
    }

    fn unfollow_bookmark(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        (**self).unfollow_bookmark(user_id, bookmark_id)
    }

    fn follow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        (**self).follow_user(user_id, target_id)
    }

    fn unfollow_user(&self, user_id: &Id, target_id: &Id) -> StoreResult<()> {
        (**self).unfollow_user(user_id, target_id)
    }

    fn followed_bookmarks(&self, user_id: &Id) -> StoreResult<Vec<Id>> {
        (**self).followed_bookmarks(user_id)
    }

    fn followed_users(&self, user_id: &Id) -> StoreResult<Vec<User>> {
        (**self).followed_users(user_id)
    }

    fn fan_out(&self, bookmark_id: &Id, title: &str) -> StoreResult<()> {
        (**self).fan_out(bookmark_id, title)
    }

    fn notifications(&self, user_id: &Id) -> StoreResult<Vec<NotificationEntry>> {
        (**self).notifications(user_id)
    }

    fn remove_notification(&self, user_id: &Id, bookmark_id: &Id) -> StoreResult<()> {
        (**self).remove_notification(user_id, bookmark_id)
    }
}

impl BookmarkStore for std::sync::Arc<SqliteStore> {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> StoreResult<()> {
        (**self).insert_bookmark(bookmark)
    }

    fn get_bookmark(&self, bookmark_id: &Id) -> StoreResult<Option<Bookmark>> {
        (**self).get_bookmark(bookmark_id)
    }

    fn bookmarks_of(&self, user_id: &Id, with_answers: bool) -> StoreResult<Vec<Bookmark>> {
        (**self).bookmarks_of(user_id, with_answers)
    }

    fn titles_of(&self, bookmark_ids: &[Id]) -> StoreResult<HashMap<Id, String>> {
        (**self).titles_of(bookmark_ids)
    }

    fn add_answer(
        &self,
        bookmark_id: &Id,
        answer: &str,
        requester_id: &Id,
    ) -> StoreResult<AnswerOutcome> {
        (**self).add_answer(bookmark_id, answer, requester_id)
    }

    fn remove_answer(
        &self,
        answer: &str,
        bookmark_id: &Id,
        requester_id: &Id,
    ) -> StoreResult<()> {
        (**self).remove_answer(answer, bookmark_id, requester_id)
    }

    fn delete_bookmark(&self, bookmark_id: &Id, requester_id: &Id) -> StoreResult<()> {
        (**self).delete_bookmark(bookmark_id, requester_id)
    }
}

impl SessionStore for std::sync::Arc<SqliteStore> {
    fn issue(&self, user_id: &Id) -> StoreResult<Session> {
        (**self).issue(user_id)
    }

    fn resolve(&self, token: &Id) -> StoreResult<Id> {
        (**self).resolve(token)
    }

    fn revoke(&self, token: &Id) -> StoreResult<()> {
        (**self).revoke(token)
    }

    fn revoke_user(&self, user_id: &Id) -> StoreResult<u64> {
        (**self).revoke_user(user_id)
    }
}

impl CommentStore for std::sync::Arc<SqliteStore> {
    fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        (**self).insert_comment(comment)
    }

    fn comments(&self, start: usize, length: usize) -> StoreResult<Vec<Comment>> {
        (**self).comments(start, length)
    }
}
