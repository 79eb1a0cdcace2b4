use std::fmt;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

use crate::validate::ValidationError;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetUser,
    SignIn,
    SignOut,
    Load,
    Add,
    Remove,
    Subscribe,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GetUser => "session check",
            Self::SignIn => "sign-in",
            Self::SignOut => "sign-out",
            Self::Load => "loading bookmarks",
            Self::Add => "adding bookmark",
            Self::Remove => "deleting bookmark",
            Self::Subscribe => "live updates",
        })
    }
}

/// Coarse error classes the presentation layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Validation,
    RemoteOperation,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: ApiError,
    },
    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("live updates failed: {0}")]
    Realtime(String),
    #[error("invalid sign-in callback: {0}")]
    Callback(String),
    #[error("invalid remote configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn remote(operation: Operation, source: ApiError) -> Self {
        Self::Remote { operation, source }
    }

    pub fn transport(operation: Operation) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { operation, source }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Remote { operation, .. } | Self::Transport { operation, .. } => Some(*operation),
            Self::Realtime(_) => Some(Operation::Subscribe),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotSignedIn | Self::Callback(_) => ErrorKind::Auth,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::RemoteOperation,
            _ => match self.operation() {
                Some(Operation::GetUser | Operation::SignIn | Operation::SignOut) => {
                    ErrorKind::Auth
                }
                _ => ErrorKind::RemoteOperation,
            },
        }
    }

    /// True when the remote rejected the caller's credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.remote_code() == Some(ErrorCode::Unauthorized)
    }

    pub fn remote_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Remote { source, .. } => Some(source.code),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
