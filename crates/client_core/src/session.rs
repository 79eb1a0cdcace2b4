use std::sync::Arc;

use shared::domain::{OAuthProvider, Session};
use tracing::{info, warn};
use url::Url;

use crate::{
    error::{ClientError, Result},
    remote::AuthBackend,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

pub struct SessionManager {
    auth: Arc<dyn AuthBackend>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            auth,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }

    /// Asks the identity endpoint who is signed in. Any failure degrades to
    /// the anonymous state.
    pub async fn refresh(&mut self) -> Option<Session> {
        self.state = match self.auth.get_user().await {
            Ok(Some(user)) => SessionState::Authenticated(user.into_session()),
            Ok(None) => SessionState::Anonymous,
            Err(err) => {
                warn!("session: identity check failed, treating as signed out: {err}");
                SessionState::Anonymous
            }
        };
        self.current().cloned()
    }

    pub async fn login(&self, provider: OAuthProvider) -> Result<Url> {
        let url = self.auth.sign_in_with_oauth(provider).await?;
        info!(provider = %provider, "session: oauth flow started");
        Ok(url)
    }

    pub async fn complete_login(&mut self, callback: &Url) -> Result<Session> {
        self.auth.complete_oauth(callback).await?;
        match self.refresh().await {
            Some(session) => {
                info!(user_id = %session.user_id, "session: signed in");
                Ok(session)
            }
            None => Err(ClientError::NotSignedIn),
        }
    }

    /// Drops the local session after the remote rejected its credentials.
    pub fn expire(&mut self) {
        if let Some(session) = self.current() {
            warn!(user_id = %session.user_id, "session: credentials rejected, signing out locally");
        }
        self.state = SessionState::Anonymous;
    }

    /// The local session is cleared even when the remote sign-out fails.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.auth.sign_out().await;
        self.state = SessionState::Anonymous;
        if let Err(err) = &result {
            warn!("session: remote sign-out failed: {err}");
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
