//! Text rendering of the two screens: login and the bookmark dashboard.

use client_core::SessionState;
use shared::domain::{Bookmark, OAuthProvider, Session};

pub const APP_TITLE: &str = "Smart Bookmark";
const TAGLINE: &str = "Organize your web with style";
const PRIVACY_NOTE: &str = "We only use your email for identification";
const EMPTY_COLLECTION: &str = "Your collection is empty – add your first bookmark!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// View-local state that outlives a single render.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Shown under the add form until the next `add`.
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
}

pub struct Screen<'a> {
    pub session: &'a SessionState,
    pub bookmarks: &'a [Bookmark],
    pub live: bool,
    pub provider: OAuthProvider,
    pub view: &'a ViewState,
}

pub fn render(screen: &Screen<'_>) -> String {
    let mut lines = match screen.session {
        SessionState::Anonymous => login_screen(screen.provider),
        SessionState::Authenticated(session) => dashboard(session, screen),
    };

    match &screen.view.notice {
        Some(Notice::Info(message)) => lines.push(format!("\n{message}")),
        Some(Notice::Error(message)) => lines.push(format!("\nerror: {message}")),
        None => {}
    }

    lines.join("\n")
}

fn login_screen(provider: OAuthProvider) -> Vec<String> {
    vec![
        APP_TITLE.to_string(),
        TAGLINE.to_string(),
        String::new(),
        format!("  Login with {}  (type `login`)", provider.label()),
        String::new(),
        format!("  {PRIVACY_NOTE}"),
    ]
}

fn dashboard(session: &Session, screen: &Screen<'_>) -> Vec<String> {
    let welcome = if session.display_name.is_empty() {
        "Welcome".to_string()
    } else {
        format!("Welcome, {}", session.display_name)
    };
    let feed = if screen.live {
        "live updates on"
    } else {
        "live updates off, use `reload`"
    };

    let mut lines = vec![
        format!("{APP_TITLE}  [{feed}]"),
        welcome,
        String::new(),
        "Add Bookmark".to_string(),
        "  add <url> <title...>".to_string(),
    ];
    if let Some(error) = &screen.view.form_error {
        lines.push(format!("  ! {error}"));
    }

    lines.push(String::new());
    lines.push(format!("Your Bookmarks ({})", screen.bookmarks.len()));
    if screen.bookmarks.is_empty() {
        lines.push(format!("  {EMPTY_COLLECTION}"));
    }
    let width = screen
        .bookmarks
        .iter()
        .map(|b| b.id.to_string().len())
        .max()
        .unwrap_or(1);
    for bookmark in screen.bookmarks {
        lines.push(format!(
            "  [{:>width$}] {}",
            bookmark.id.to_string(),
            bookmark.title
        ));
        lines.push(format!("  {:>width$}   {}", "", bookmark.url));
    }

    lines
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
