use client_core::{BookmarkApp, ClientError};
use shared::{domain::OAuthProvider, protocol::ChangeEvent};
use tracing::{debug, warn};

use crate::{
    command::{Command, HELP},
    view::{self, Notice, Screen, ViewState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes shell commands and feed events into the app and keeps what the
/// next render shows.
pub struct Shell {
    app: BookmarkApp,
    provider: OAuthProvider,
    view: ViewState,
}

impl Shell {
    pub fn new(app: BookmarkApp, provider: OAuthProvider) -> Self {
        Self {
            app,
            provider,
            view: ViewState::default(),
        }
    }

    pub fn app_mut(&mut self) -> &mut BookmarkApp {
        &mut self.app
    }

    pub fn render(&self) -> String {
        view::render(&Screen {
            session: self.app.session_state(),
            bookmarks: self.app.bookmarks(),
            live: self.app.is_live(),
            provider: self.provider,
            view: &self.view,
        })
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.view.notice = Some(Notice::Error(message.into()));
    }

    fn info(&mut self, message: impl Into<String>) {
        self.view.notice = Some(Notice::Info(message.into()));
    }

    fn report(&mut self, err: ClientError) {
        warn!(kind = ?err.kind(), "{err}");
        self.error(err.to_string());
    }

    pub async fn start(&mut self) {
        match self.app.start().await {
            Ok(Some(session)) => debug!(user_id = %session.user_id, "shell: resumed session"),
            Ok(None) => {}
            Err(err) => self.report(err),
        }
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "shell: command");
        self.view.notice = None;

        match command {
            Command::Login(provider) => {
                if let Some(session) = self.app.session() {
                    let message = format!("already signed in as {}", session.display_name);
                    self.info(message);
                    return Flow::Continue;
                }
                let provider = provider.unwrap_or(self.provider);
                match self.app.login(provider).await {
                    Ok(url) => self.info(format!(
                        "Open this page to sign in with {}:\n  {url}\n\
                         then paste the address you land on: callback <redirect-url>",
                        provider.label()
                    )),
                    Err(err) => self.report(err),
                }
            }
            Command::Callback(url) => match self.app.complete_login(&url).await {
                Ok(session) => self.info(format!("signed in as {}", session.display_name)),
                Err(err) => self.report(err),
            },
            Command::Add { url, title } => {
                self.view.form_error = None;
                match self.app.add(&title, &url).await {
                    Ok(bookmark) => self.info(format!("saved \"{}\"", bookmark.title)),
                    Err(ClientError::Validation(err)) => {
                        self.view.form_error = Some(err.to_string())
                    }
                    Err(err) => self.report(err),
                }
            }
            Command::Remove(id) => match self.app.remove(id).await {
                Ok(()) => self.info(format!("deleting [{id}]...")),
                Err(err) => self.report(err),
            },
            Command::Reload => {
                let reloaded = self.app.reload().await.map(|rows| rows.len());
                match reloaded {
                    Ok(count) => self.info(format!("{count} bookmarks loaded")),
                    Err(err) => self.report(err),
                }
            }
            Command::WhoAmI => {
                let message = match self.app.session() {
                    Some(session) => format!("{} ({})", session.display_name, session.user_id),
                    None => "not signed in".to_string(),
                };
                self.info(message);
            }
            Command::Logout => {
                self.view.form_error = None;
                match self.app.logout().await {
                    Ok(()) => self.info("signed out"),
                    Err(err) => self.report(err),
                }
            }
            Command::Help => self.info(HELP),
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    /// Reconciles after a feed event; `None` means the feed ended.
    pub async fn on_feed(&mut self, event: Option<ChangeEvent>) {
        match event {
            Some(event) => {
                if let Err(err) = self.app.on_change(&event).await {
                    self.report(err);
                }
            }
            None => self.error("live updates stopped; use `reload` to refresh"),
        }
    }
}
