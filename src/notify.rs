//! Notification read path
//!
//! Entries store a denormalized title so a notification can outlive its
//! source bookmark, but the title is never trusted as stored: reads
//! re-join against the bookmark store so a renamed bookmark shows its
//! current title.

use crate::error::ServiceError;
use crate::id::Id;
use crate::store::{BookmarkStore, NotificationEntry, UserStore};

/// A user's notifications with freshly joined titles
pub fn notifications_for<U, B>(
    users: &U,
    bookmarks: &B,
    user_id: &Id,
) -> Result<Vec<NotificationEntry>, ServiceError>
where
    U: UserStore,
    B: BookmarkStore,
{
    let mut entries = users.notifications(user_id)?;
    if entries.is_empty() {
        return Ok(entries);
    }

    let ids: Vec<Id> = entries.iter().map(|e| e.bookmark_id.clone()).collect();
    let titles = bookmarks.titles_of(&ids)?;

    for entry in &mut entries {
        // A deleted bookmark keeps the last denormalized title
        if let Some(title) = titles.get(&entry.bookmark_id) {
            entry.title = title.clone();
        }
    }
    Ok(entries)
}
