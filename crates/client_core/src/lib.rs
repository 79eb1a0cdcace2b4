pub mod app;
pub mod bookmarks;
pub mod error;
pub mod realtime;
pub mod remote;
pub mod session;
pub mod supabase;
pub mod validate;

pub use app::BookmarkApp;
pub use bookmarks::BookmarkListController;
pub use error::{ClientError, ErrorKind, Operation, Result};
pub use remote::{AuthBackend, BookmarkTable, ChangeFeed, Subscription};
pub use session::{SessionManager, SessionState};
pub use supabase::{SupabaseClient, SupabaseConfig};
pub use validate::{validate_new_bookmark, validate_url, ValidationError, INVALID_URL_MESSAGE};

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod fakes;
