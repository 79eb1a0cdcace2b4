use thiserror::Error;
use url::Url;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL (including https://)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be blank")]
    EmptyTitle,
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("{}", INVALID_URL_MESSAGE)]
    InvalidUrl,
}

/// Checks a URL as typed into the form. Empty input is "not yet entered"
/// and yields no message; anything else must be absolute with a host.
pub fn validate_url(candidate: &str) -> Option<&'static str> {
    if candidate.is_empty() {
        return None;
    }
    match Url::parse(candidate) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => None,
        _ => Some(INVALID_URL_MESSAGE),
    }
}

pub fn validate_new_bookmark(title: &str, url: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if validate_url(url).is_some() {
        return Err(ValidationError::InvalidUrl);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
