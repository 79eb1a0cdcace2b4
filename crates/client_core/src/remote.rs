use async_trait::async_trait;
use shared::{
    domain::{Bookmark, BookmarkId, NewBookmark, OAuthProvider, UserId},
    protocol::{AuthUser, ChangeEvent},
};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use url::Url;

use crate::error::Result;

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `Ok(None)` when no session is held locally.
    async fn get_user(&self) -> Result<Option<AuthUser>>;
    /// Returns the provider page the user has to be sent to.
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<Url>;
    /// Consumes the redirect the provider sent the user back with.
    async fn complete_oauth(&self, callback: &Url) -> Result<()>;
    async fn sign_out(&self) -> Result<()>;
}

#[async_trait]
pub trait BookmarkTable: Send + Sync {
    async fn list(&self, owner: UserId) -> Result<Vec<Bookmark>>;
    async fn insert(&self, bookmark: &NewBookmark) -> Result<Bookmark>;
    async fn delete(&self, id: BookmarkId) -> Result<()>;
}

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, owner: UserId) -> Result<Subscription>;
}

/// Live handle on an owner-filtered change feed. Dropping it cancels the feed.
#[derive(Debug)]
pub struct Subscription {
    owner: UserId,
    events: mpsc::Receiver<ChangeEvent>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Subscription {
    pub fn new(
        owner: UserId,
        events: mpsc::Receiver<ChangeEvent>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self {
            owner,
            events,
            cancel: Some(cancel),
        }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// `None` once the feed has ended.
    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Releases the feed now rather than at end of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
            debug!(owner = %self.owner, "realtime: subscription released");
        }
    }
}
