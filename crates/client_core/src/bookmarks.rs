use std::sync::Arc;

use shared::{
    domain::{Bookmark, BookmarkId, NewBookmark, UserId},
    protocol::ChangeEvent,
};
use tracing::{debug, info};

use crate::{error::Result, remote::BookmarkTable, validate::validate_new_bookmark};

/// Owns the newest-first list of the signed-in user's bookmarks.
pub struct BookmarkListController {
    table: Arc<dyn BookmarkTable>,
    bookmarks: Vec<Bookmark>,
}

impl BookmarkListController {
    pub fn new(table: Arc<dyn BookmarkTable>) -> Self {
        Self {
            table,
            bookmarks: Vec::new(),
        }
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Replaces the whole list with a fresh read. The list is untouched when
    /// the read fails.
    pub async fn load(&mut self, owner: UserId) -> Result<&[Bookmark]> {
        let mut rows = self.table.list(owner).await?;
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        debug!(owner = %owner, count = rows.len(), "bookmarks: reloaded");
        self.bookmarks = rows;
        Ok(&self.bookmarks)
    }

    pub async fn add(&mut self, title: &str, url: &str, owner: UserId) -> Result<Bookmark> {
        validate_new_bookmark(title, url)?;
        let created = self
            .table
            .insert(&NewBookmark {
                title: title.trim().to_string(),
                url: url.to_string(),
                owner,
            })
            .await?;
        info!(id = %created.id, "bookmarks: created");
        self.bookmarks.insert(0, created.clone());
        Ok(created)
    }

    /// Deletes remotely only; the row leaves the list when the change feed
    /// reports the delete.
    pub async fn remove(&self, id: BookmarkId) -> Result<()> {
        self.table.delete(id).await?;
        info!(id = %id, "bookmarks: delete requested");
        Ok(())
    }

    pub async fn apply_change(&mut self, owner: UserId, event: &ChangeEvent) -> Result<()> {
        debug!(
            owner = %owner,
            kind = ?event.kind,
            record_id = ?event.record_id,
            "bookmarks: change notification"
        );
        self.load(owner).await.map(|_| ())
    }

    pub fn clear(&mut self) {
        self.bookmarks.clear();
    }
}

#[cfg(test)]
#[path = "tests/bookmarks_tests.rs"]
mod tests;
