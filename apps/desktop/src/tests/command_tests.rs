use super::*;

fn parsed(line: &str) -> Command {
    parse(line).expect("parse").expect("command")
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(parse("").expect("parse"), None);
    assert_eq!(parse("   \t").expect("parse"), None);
}

#[test]
fn add_splits_url_from_multi_word_title() {
    assert_eq!(
        parsed("add https://www.rust-lang.org  The Rust  Language "),
        Command::Add {
            url: "https://www.rust-lang.org".into(),
            title: "The Rust  Language".into(),
        }
    );
    assert_eq!(
        parsed("add https://example.com"),
        Command::Add {
            url: "https://example.com".into(),
            title: String::new(),
        }
    );
    assert!(parse("add").is_err());
}

#[test]
fn remove_needs_a_numeric_id() {
    assert_eq!(parsed("rm 42"), Command::Remove(BookmarkId(42)));
    assert_eq!(parsed("delete 7"), Command::Remove(BookmarkId(7)));
    assert!(parse("rm").is_err());
    assert!(parse("rm first").is_err());
}

#[test]
fn login_takes_an_optional_provider() {
    assert_eq!(parsed("login"), Command::Login(None));
    assert_eq!(
        parsed("LOGIN github"),
        Command::Login(Some(OAuthProvider::Github))
    );
    assert!(parse("login myspace").is_err());
}

#[test]
fn callback_requires_an_absolute_url() {
    match parsed("callback http://localhost:3000/#access_token=abc") {
        Command::Callback(url) => assert_eq!(url.fragment(), Some("access_token=abc")),
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(parse("callback").is_err());
    assert!(parse("callback not-a-url").is_err());
}

#[test]
fn simple_commands_and_unknown_input() {
    assert_eq!(parsed("reload"), Command::Reload);
    assert_eq!(parsed("whoami"), Command::WhoAmI);
    assert_eq!(parsed("logout"), Command::Logout);
    assert_eq!(parsed("?"), Command::Help);
    assert_eq!(parsed("exit"), Command::Quit);

    let err = parse("frobnicate now").expect_err("unknown");
    assert!(err.to_string().contains("frobnicate"));
}
