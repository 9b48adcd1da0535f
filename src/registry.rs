//! User registry: registration, credential verification, account removal
//!
//! Orchestrates the user store, the credential hashing in [`crate::crypto`],
//! and the token issuer. The availability pre-checks are advisory; the
//! store's insert is the authority on uniqueness.

use crate::crypto;
use crate::error::ServiceError;
use crate::id::Id;
use crate::store::{Session, SessionStore, User, UserStore};

fn not_empty(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.is_empty())
}

/// Register a new user
///
/// Requires a non-empty password and at least one of username/email.
/// Returns the stored user, identity assigned, with empty follow sets
/// and notification list.
pub fn register<U: UserStore>(
    users: &U,
    username: Option<&str>,
    email: Option<&str>,
    password: &str,
) -> Result<User, ServiceError> {
    if password.is_empty() || !(not_empty(username) || not_empty(email)) {
        return Err(ServiceError::IncompleteInput);
    }
    let username = username.filter(|s| !s.is_empty());
    let email = email.filter(|s| !s.is_empty());

    if let Some(name) = username {
        if !users.is_username_available(name)? {
            return Err(ServiceError::UsernameTaken);
        }
    }
    if let Some(email) = email {
        if !users.is_email_available(email)? {
            return Err(ServiceError::EmailTaken);
        }
    }

    let salt = crypto::generate_salt();
    let hash = crypto::hash_password(password, &salt)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

    let user = User::new(
        username.map(str::to_string),
        email.map(str::to_string),
        hash,
        salt,
    );
    users.insert_user(&user)?;

    tracing::info!(user_id = %user.id, "Registered user");
    Ok(user)
}

/// Verify credentials and mint a session token
///
/// `login` matches either username or email. Fails `NotFound` when no
/// user matches, `WrongPassword` on a credential mismatch.
pub fn verify<U, S>(
    users: &U,
    sessions: &S,
    login: &str,
    password: &str,
) -> Result<(Id, Session), ServiceError>
where
    U: UserStore,
    S: SessionStore,
{
    let user = users.find_by_login(login)?.ok_or(ServiceError::NotFound)?;

    let valid = crypto::verify_password(password, &user.salt, &user.password_hash)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    if !valid {
        return Err(ServiceError::WrongPassword);
    }

    let session = sessions.issue(&user.id)?;
    Ok((user.id, session))
}

/// Delete a user account and revoke its sessions
///
/// The user's bookmarks and other users' follow edges are knowingly left
/// in place.
pub fn remove<U, S>(users: &U, sessions: &S, user_id: &Id) -> Result<(), ServiceError>
where
    U: UserStore,
    S: SessionStore,
{
    users.delete_user(user_id)?;
    let revoked = sessions.revoke_user(user_id)?;
    tracing::info!(user_id = %user_id, revoked, "Deleted user account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemorySessionStore, InMemoryUserStore};

    #[test]
    fn test_register_then_verify_round_trips() {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();

        let user = register(&users, Some("alice"), None, "pw1").unwrap();
        let (user_id, session) = verify(&users, &sessions, "alice", "pw1").unwrap();

        assert_eq!(user_id, user.id);
        assert_eq!(sessions.resolve(&session.token).unwrap(), user.id);
    }

    #[test]
    fn test_wrong_password_is_always_wrong_password() {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();
        register(&users, Some("alice"), None, "pw1").unwrap();

        let result = verify(&users, &sessions, "alice", "pw2");
        assert!(matches!(result, Err(ServiceError::WrongPassword)));
    }

    #[test]
    fn test_unknown_login_is_not_found() {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();

        let result = verify(&users, &sessions, "nobody", "pw");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn test_incomplete_input() {
        let users = InMemoryUserStore::new();

        assert!(matches!(
            register(&users, Some("alice"), None, ""),
            Err(ServiceError::IncompleteInput)
        ));
        assert!(matches!(
            register(&users, None, None, "pw"),
            Err(ServiceError::IncompleteInput)
        ));
        // Empty strings count as absent
        assert!(matches!(
            register(&users, Some(""), Some(""), "pw"),
            Err(ServiceError::IncompleteInput)
        ));
    }

    #[test]
    fn test_duplicate_username_taken() {
        let users = InMemoryUserStore::new();
        register(&users, Some("alice"), None, "pw").unwrap();

        let result = register(&users, Some("alice"), None, "pw");
        assert!(matches!(result, Err(ServiceError::UsernameTaken)));
    }

    #[test]
    fn test_duplicate_email_taken() {
        let users = InMemoryUserStore::new();
        register(&users, None, Some("a@example.com"), "pw").unwrap();

        let result = register(&users, Some("bob"), Some("a@example.com"), "pw");
        assert!(matches!(result, Err(ServiceError::EmailTaken)));
    }

    #[test]
    fn test_email_login_works() {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();
        register(&users, None, Some("a@example.com"), "pw").unwrap();

        assert!(verify(&users, &sessions, "a@example.com", "pw").is_ok());
    }

    #[test]
    fn test_remove_revokes_sessions() {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();
        let user = register(&users, Some("alice"), None, "pw").unwrap();
        let (_, session) = verify(&users, &sessions, "alice", "pw").unwrap();

        remove(&users, &sessions, &user.id).unwrap();
        assert!(users.get_user(&user.id).unwrap().is_none());
        assert!(matches!(
            sessions.resolve(&session.token),
            Err(ServiceError::InvalidToken)
        ));

        // Zero rows affected on a second removal
        assert!(matches!(
            remove(&users, &sessions, &user.id),
            Err(ServiceError::NotFound)
        ));
    }
}
