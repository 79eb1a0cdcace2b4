use super::*;
use crate::{
    error::{ClientError, Operation},
    fakes::{bookmark, change, user_id, FakeBackend},
    validate::ValidationError,
};
use shared::protocol::ChangeKind;

fn ids(controller: &BookmarkListController) -> Vec<i64> {
    controller.bookmarks().iter().map(|b| b.id.0).collect()
}

#[tokio::test]
async fn load_orders_newest_first() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![
        bookmark(3, owner),
        bookmark(1, owner),
        bookmark(2, owner),
    ]);
    let mut controller = BookmarkListController::new(backend.clone());

    controller.load(owner).await.expect("load");

    assert_eq!(ids(&controller), vec![3, 2, 1]);
    assert_eq!(backend.list_calls(), vec![owner]);
}

#[tokio::test]
async fn load_replaces_previous_collection() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner), bookmark(2, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("first load");

    backend.set_rows(vec![bookmark(7, owner)]);
    controller.load(owner).await.expect("second load");

    assert_eq!(ids(&controller), vec![7]);
}

#[tokio::test]
async fn failed_load_keeps_prior_collection_and_reports() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("load");

    backend.fail(Operation::Load);
    let err = controller.load(owner).await.expect_err("load should fail");

    assert_eq!(err.operation(), Some(Operation::Load));
    assert_eq!(ids(&controller), vec![1]);
}

#[tokio::test]
async fn add_prepends_server_record() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(4, owner), bookmark(5, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("load");

    let created = controller
        .add("Example", "https://example.com", owner)
        .await
        .expect("add");

    assert_eq!(created.id.0, 6);
    assert_eq!(created.owner, owner);
    assert_eq!(controller.bookmarks().first(), Some(&created));
    assert_eq!(ids(&controller), vec![6, 5, 4]);
}

#[tokio::test]
async fn add_rejects_invalid_input_without_a_request() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    let mut controller = BookmarkListController::new(backend.clone());

    for (title, url, expected) in [
        ("", "https://example.com", ValidationError::EmptyTitle),
        ("Example", "", ValidationError::EmptyUrl),
        ("Example", "example.com", ValidationError::InvalidUrl),
    ] {
        let err = controller
            .add(title, url, owner)
            .await
            .expect_err("invalid input");
        assert!(
            matches!(err, ClientError::Validation(found) if found == expected),
            "{title:?} {url:?} -> {err}"
        );
    }

    assert!(backend.insert_calls().is_empty());
    assert!(controller.is_empty());
}

#[tokio::test]
async fn failed_add_leaves_collection_unchanged() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("load");
    backend.fail(Operation::Add);

    let err = controller
        .add("Example", "https://example.com", owner)
        .await
        .expect_err("add should fail");

    assert_eq!(err.operation(), Some(Operation::Add));
    assert_eq!(backend.insert_calls().len(), 1);
    assert_eq!(ids(&controller), vec![1]);
}

#[tokio::test]
async fn add_trims_title_before_sending() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    let mut controller = BookmarkListController::new(backend.clone());

    controller
        .add("  Rust  ", "https://www.rust-lang.org", owner)
        .await
        .expect("add");

    let sent = backend.insert_calls();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Rust");
    assert_eq!(sent[0].url, "https://www.rust-lang.org");
    assert_eq!(sent[0].owner, owner);
}

#[tokio::test]
async fn remove_issues_one_delete_and_keeps_local_row() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner), bookmark(2, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("load");

    controller.remove(BookmarkId(2)).await.expect("remove");

    assert_eq!(backend.delete_calls(), vec![BookmarkId(2)]);
    assert_eq!(ids(&controller), vec![2, 1]);
}

#[tokio::test]
async fn change_notification_reloads_once_for_owner() {
    let owner = user_id(9);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());

    controller
        .apply_change(owner, &change(ChangeKind::Delete))
        .await
        .expect("reconcile");

    assert_eq!(backend.list_calls(), vec![owner]);
    assert_eq!(ids(&controller), vec![1]);
}

#[tokio::test]
async fn clear_empties_the_list() {
    let owner = user_id(1);
    let backend = FakeBackend::new();
    backend.set_rows(vec![bookmark(1, owner)]);
    let mut controller = BookmarkListController::new(backend.clone());
    controller.load(owner).await.expect("load");

    controller.clear();

    assert!(controller.is_empty());
}
