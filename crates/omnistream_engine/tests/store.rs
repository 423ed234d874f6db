use std::fs;

use omnistream_core::{AccountStatus, ConnectionMode, Platform};
use omnistream_engine::{
    connect_account, disconnect_account, AccountResolver, AccountStore, FileAccountStore,
    StoreError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn accounts_survive_a_reopen() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    connect_account(&store, Platform::YouTube, ConnectionMode::Authenticated, Some("tok".into()))
        .unwrap();
    connect_account(&store, Platform::Douyin, ConnectionMode::Simulated, None).unwrap();

    let reopened = FileAccountStore::in_dir(temp.path());
    let platforms: Vec<_> = reopened.list().unwrap().iter().map(|a| a.platform).collect();
    assert_eq!(platforms, vec![Platform::Douyin, Platform::YouTube]);

    let youtube = reopened.resolve(Platform::YouTube).unwrap();
    assert_eq!(youtube.credential(), Some("tok"));
    assert_eq!(youtube.username, "YouTube_Dev_User");
}

#[test]
fn reconnect_replaces_the_previous_account() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    connect_account(&store, Platform::X, ConnectionMode::Simulated, None).unwrap();
    connect_account(&store, Platform::X, ConnectionMode::Authenticated, Some("new".into())).unwrap();

    let accounts = store.list().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].mode, ConnectionMode::Authenticated);
}

#[test]
fn disconnect_removes_only_that_platform() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    connect_account(&store, Platform::Bilibili, ConnectionMode::Simulated, None).unwrap();
    connect_account(&store, Platform::TikTok, ConnectionMode::Simulated, None).unwrap();

    assert!(disconnect_account(&store, Platform::Bilibili).unwrap());
    assert!(!store.is_connected(Platform::Bilibili));
    assert!(store.is_connected(Platform::TikTok));
}

#[test]
fn expired_account_is_stored_but_not_resolved() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    let mut account =
        connect_account(&store, Platform::Kuaishou, ConnectionMode::Simulated, None).unwrap();
    account.status = AccountStatus::Expired;
    store.put(account).unwrap();

    assert!(store.get(Platform::Kuaishou).unwrap().is_some());
    assert!(store.resolve(Platform::Kuaishou).is_none());
}

#[test]
fn missing_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::new(temp.path().join("nested/dir/accounts.json"));
    assert!(store.list().unwrap().is_empty());
    connect_account(&store, Platform::X, ConnectionMode::Simulated, None).unwrap();
    assert!(store.path().exists());
}

#[test]
fn corrupt_file_is_an_error_and_resolves_to_nothing() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    fs::write(store.path(), "{ not json").unwrap();

    assert!(matches!(store.list(), Err(StoreError::Json(_))));
    assert!(store.resolve(Platform::X).is_none());
}

#[test]
fn tokens_are_not_printed_in_debug_output() {
    let temp = TempDir::new().unwrap();
    let store = FileAccountStore::in_dir(temp.path());
    let account = connect_account(
        &store,
        Platform::YouTube,
        ConnectionMode::Authenticated,
        Some("super-secret".into()),
    )
    .unwrap();
    assert!(!format!("{account:?}").contains("super-secret"));
}
