use super::*;
use crate::{
    error::{ErrorKind, Operation},
    fakes::{auth_user, user_id, FakeBackend},
};

#[tokio::test]
async fn starts_anonymous_until_checked() {
    let backend = FakeBackend::new();
    backend.sign_in_as(auth_user(user_id(1), "Ada"));
    let manager = SessionManager::new(backend);

    assert_eq!(manager.state(), &SessionState::Anonymous);
    assert!(manager.current().is_none());
}

#[tokio::test]
async fn refresh_picks_up_signed_in_user() {
    let backend = FakeBackend::new();
    backend.sign_in_as(auth_user(user_id(1), "Ada Lovelace"));
    let mut manager = SessionManager::new(backend);

    let session = manager.refresh().await.expect("session");

    assert_eq!(session.user_id, user_id(1));
    assert_eq!(session.display_name, "Ada Lovelace");
    assert_eq!(manager.state(), &SessionState::Authenticated(session));
}

#[tokio::test]
async fn refresh_fails_soft_to_anonymous() {
    let backend = FakeBackend::new();
    backend.sign_in_as(auth_user(user_id(1), "Ada"));
    let mut manager = SessionManager::new(backend.clone());
    manager.refresh().await.expect("session");

    backend.fail(Operation::GetUser);

    assert!(manager.refresh().await.is_none());
    assert_eq!(manager.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn login_returns_provider_redirect() {
    let backend = FakeBackend::new();
    let manager = SessionManager::new(backend);

    let url = manager
        .login(OAuthProvider::Github)
        .await
        .expect("authorize url");

    assert_eq!(
        url.query_pairs().find(|(key, _)| key == "provider").map(|(_, v)| v.into_owned()),
        Some("github".to_string())
    );
    assert_eq!(manager.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn complete_login_authenticates() {
    let backend = FakeBackend::new();
    backend.accept_oauth_as(auth_user(user_id(5), "Grace"));
    let mut manager = SessionManager::new(backend);
    let callback = Url::parse("http://localhost:3000/#access_token=abc").expect("url");

    let session = manager.complete_login(&callback).await.expect("login");

    assert_eq!(session.user_id, user_id(5));
    assert_eq!(manager.current(), Some(&session));
}

#[tokio::test]
async fn complete_login_without_identity_stays_anonymous() {
    let backend = FakeBackend::new();
    let mut manager = SessionManager::new(backend);
    let callback = Url::parse("http://localhost:3000/#access_token=abc").expect("url");

    let err = manager
        .complete_login(&callback)
        .await
        .expect_err("no user behind the token");

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(manager.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn logout_clears_state_even_when_remote_fails() {
    let backend = FakeBackend::new();
    backend.sign_in_as(auth_user(user_id(1), "Ada"));
    let mut manager = SessionManager::new(backend.clone());
    manager.refresh().await.expect("session");
    backend.fail(Operation::SignOut);

    let err = manager.logout().await.expect_err("remote sign-out fails");

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(manager.state(), &SessionState::Anonymous);
    assert_eq!(backend.sign_out_calls(), 1);
}

#[tokio::test]
async fn expire_drops_the_session_without_remote_sign_out() {
    let backend = FakeBackend::new();
    backend.sign_in_as(auth_user(user_id(1), "Ada"));
    let mut manager = SessionManager::new(backend.clone());
    manager.refresh().await.expect("session");

    manager.expire();

    assert_eq!(manager.state(), &SessionState::Anonymous);
    assert_eq!(backend.sign_out_calls(), 0);
}
