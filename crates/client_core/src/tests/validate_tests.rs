use super::*;

#[test]
fn empty_input_is_not_an_error() {
    assert_eq!(validate_url(""), None);
}

#[test]
fn absolute_urls_with_host_pass() {
    for candidate in [
        "https://example.com",
        "http://localhost:3000/path?q=1#frag",
        "https://sub.example.co.uk/a/b",
        "ftp://files.example.org",
        "http://127.0.0.1:8080",
    ] {
        assert_eq!(validate_url(candidate), None, "{candidate}");
    }
}

#[test]
fn non_urls_get_the_fixed_message() {
    for candidate in [
        "example.com",
        "not a url",
        " ",
        "https://",
        "/relative/path",
        "mailto:someone@example.com",
        "file:///etc/hosts",
        "http//missing-colon.com",
    ] {
        assert_eq!(validate_url(candidate), Some(INVALID_URL_MESSAGE), "{candidate}");
    }
}

#[test]
fn new_bookmark_preconditions() {
    assert_eq!(
        validate_new_bookmark("", "https://example.com"),
        Err(ValidationError::EmptyTitle)
    );
    assert_eq!(
        validate_new_bookmark("   ", "https://example.com"),
        Err(ValidationError::EmptyTitle)
    );
    assert_eq!(
        validate_new_bookmark("Example", ""),
        Err(ValidationError::EmptyUrl)
    );
    assert_eq!(
        validate_new_bookmark("Example", "example.com"),
        Err(ValidationError::InvalidUrl)
    );
    assert_eq!(validate_new_bookmark("Example", "https://example.com"), Ok(()));
}

#[test]
fn invalid_url_error_renders_the_inline_message() {
    assert_eq!(ValidationError::InvalidUrl.to_string(), INVALID_URL_MESSAGE);
}

#[test]
fn blank_title_message_says_blank() {
    assert_eq!(ValidationError::EmptyTitle.to_string(), "title must not be blank");
}
