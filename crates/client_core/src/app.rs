//! Ties the session, the bookmark list and the live subscription together for
//! one view.

use std::sync::Arc;

use shared::{
    domain::{Bookmark, BookmarkId, OAuthProvider, Session, UserId},
    protocol::ChangeEvent,
};
use tracing::{info, warn};
use url::Url;

use crate::{
    bookmarks::BookmarkListController,
    error::{ClientError, Result},
    remote::{AuthBackend, BookmarkTable, ChangeFeed, Subscription},
    session::{SessionManager, SessionState},
};

pub struct BookmarkApp {
    session: SessionManager,
    bookmarks: BookmarkListController,
    feed: Arc<dyn ChangeFeed>,
    subscription: Option<Subscription>,
}

impl BookmarkApp {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        table: Arc<dyn BookmarkTable>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        Self {
            session: SessionManager::new(auth),
            bookmarks: BookmarkListController::new(table),
            feed,
            subscription: None,
        }
    }

    pub fn with_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthBackend + BookmarkTable + ChangeFeed + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.bookmarks.bookmarks()
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Resolves the initial session and, when signed in, loads the list and
    /// opens the change feed.
    pub async fn start(&mut self) -> Result<Option<Session>> {
        match self.session.refresh().await {
            Some(session) => {
                let activated = self.activate(&session).await;
                self.expire_on_unauthorized(activated)?;
                Ok(Some(session))
            }
            None => {
                self.deactivate();
                Ok(None)
            }
        }
    }

    pub async fn login(&self, provider: OAuthProvider) -> Result<Url> {
        self.session.login(provider).await
    }

    pub async fn complete_login(&mut self, callback: &Url) -> Result<Session> {
        let session = match self.session.complete_login(callback).await {
            Ok(session) => session,
            Err(err) => {
                // The identity check may have dropped the previous session.
                if self.session.current().is_none() {
                    self.deactivate();
                }
                return Err(err);
            }
        };
        let activated = self.activate(&session).await;
        self.expire_on_unauthorized(activated)?;
        Ok(session)
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.deactivate();
        self.session.logout().await
    }

    pub async fn reload(&mut self) -> Result<&[Bookmark]> {
        let owner = self.owner()?;
        let loaded = self.bookmarks.load(owner).await.map(|_| ());
        self.expire_on_unauthorized(loaded)?;
        Ok(self.bookmarks.bookmarks())
    }

    pub async fn add(&mut self, title: &str, url: &str) -> Result<Bookmark> {
        let owner = self.owner()?;
        let created = self.bookmarks.add(title, url, owner).await;
        self.expire_on_unauthorized(created)
    }

    pub async fn remove(&mut self, id: BookmarkId) -> Result<()> {
        self.owner()?;
        let removed = self.bookmarks.remove(id).await;
        self.expire_on_unauthorized(removed)
    }

    /// Waits for the next change on the live feed. Never resolves while no
    /// feed is open; yields `None` once when the feed ends.
    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        let Some(subscription) = self.subscription.as_mut() else {
            return std::future::pending().await;
        };
        let event = subscription.next_change().await;
        if event.is_none() {
            warn!(owner = %subscription.owner(), "realtime: feed ended");
            self.subscription = None;
        }
        event
    }

    pub async fn on_change(&mut self, event: &ChangeEvent) -> Result<()> {
        let owner = self.owner()?;
        let applied = self.bookmarks.apply_change(owner, event).await;
        self.expire_on_unauthorized(applied)
    }

    /// A 401 means the access token is no longer accepted: the view falls
    /// back to the login screen instead of failing every later call.
    fn expire_on_unauthorized<T>(&mut self, result: Result<T>) -> Result<T> {
        if matches!(&result, Err(err) if err.is_unauthorized()) {
            self.deactivate();
            self.session.expire();
        }
        result
    }

    fn owner(&self) -> Result<UserId> {
        self.session
            .current()
            .map(|session| session.user_id)
            .ok_or(ClientError::NotSignedIn)
    }

    async fn activate(&mut self, session: &Session) -> Result<()> {
        // At most one feed is open; the old one is released before subscribing.
        self.subscription = None;
        // Rows of a previous session never survive into this one.
        self.bookmarks.clear();
        let subscribed = self.feed.subscribe(session.user_id).await;
        let loaded = self.bookmarks.load(session.user_id).await.map(|_| ());
        self.subscription = Some(subscribed?);
        info!(user_id = %session.user_id, "realtime: subscribed to bookmark changes");
        loaded
    }

    fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.bookmarks.clear();
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
