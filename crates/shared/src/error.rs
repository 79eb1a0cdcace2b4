use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            400 | 406 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from an HTTP status and a raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = RemoteErrorBody::parse(body)
            .and_then(RemoteErrorBody::into_message)
            .unwrap_or_else(|| format!("remote returned status {status}"));
        Self::new(ErrorCode::from_status(status), message)
    }
}

/// Error bodies as returned by the hosted store. PostgREST uses `message`,
/// the auth service uses `msg` or the OAuth `error`/`error_description` pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl RemoteErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn into_message(self) -> Option<String> {
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)?;
        match self.hint {
            Some(hint) if !hint.is_empty() => Some(format!("{message} ({hint})")),
            _ => Some(message),
        }
    }
}
