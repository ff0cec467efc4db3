//! Integration tests for credential verification through the manager.

mod helpers;

use std::sync::Arc;

use helpers::{CallLog, CredentialsBehavior, MockAuthenticator, RecordingMatcher, get};
use warden_auth::authenticator::{Authenticator, CredentialCheck};
use warden_auth::credentials::Credentials;
use warden_auth::listeners::PasswordMigrationListener;
use warden_auth::manager::AuthenticatorManager;
use warden_auth::user_provider::{InMemoryUserProvider, UserProvider};
use warden_entity::user::User;

fn password_login(password: &str, user: User, log: &CallLog) -> MockAuthenticator {
    MockAuthenticator::new("form", log)
        .check(CredentialCheck::Password)
        .credentials(CredentialsBehavior::Present(Credentials::password("alice", password)))
        .user(Some(user))
}

fn manager_with_matcher(
    authenticator: MockAuthenticator,
    matcher: RecordingMatcher,
    log: &CallLog,
) -> AuthenticatorManager {
    let events = helpers::dispatcher(Arc::new(matcher), log);
    let authenticators: Vec<Arc<dyn Authenticator>> = vec![Arc::new(authenticator)];
    AuthenticatorManager::new("main", authenticators, Arc::new(events))
        .unwrap()
        .with_hide_user_not_found(false)
}

#[tokio::test]
async fn test_empty_password_fails_before_matcher() {
    let log = CallLog::new();
    let user = User::new("alice").with_password("stored");
    let manager = manager_with_matcher(
        password_login("", user, &log),
        RecordingMatcher::new(true, &log),
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(log.count("form:failure(EmptyCredentials)"), 1);
    assert!(log.entries().iter().all(|e| !e.starts_with("matcher:")));
    assert!(request.token_storage().token().is_none());
}

#[tokio::test]
async fn test_password_is_matched_against_stored_hash() {
    let log = CallLog::new();
    let user = User::new("alice").with_password("stored");
    let manager = manager_with_matcher(
        password_login("secret", user, &log),
        RecordingMatcher::new(true, &log),
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(log.count("matcher:stored:secret"), 1);
    assert!(request.token_storage().token().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_bad_credentials() {
    let log = CallLog::new();
    let user = User::new("alice").with_password("stored");
    let manager = manager_with_matcher(
        password_login("wrong", user, &log),
        RecordingMatcher::new(false, &log),
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(log.count("form:failure(BadCredentials)"), 1);
    assert_eq!(log.count("checker:post"), 0);
}

#[tokio::test]
async fn test_user_without_stored_password_is_accepted() {
    let log = CallLog::new();
    let manager = manager_with_matcher(
        password_login("anything", User::new("alice"), &log),
        RecordingMatcher::new(false, &log),
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert!(request.token_storage().token().is_some());
    assert!(log.entries().iter().all(|e| !e.starts_with("matcher:")));
}

#[tokio::test]
async fn test_token_check_always_verifies_with_checks_in_order() {
    let log = CallLog::new();
    let authenticator = MockAuthenticator::new("api", &log)
        .check(CredentialCheck::Token)
        .credentials(CredentialsBehavior::Present(
            Credentials::new().with_value("access_token", "whatever"),
        ));
    let manager = manager_with_matcher(authenticator, RecordingMatcher::new(false, &log), &log);
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert!(request.token_storage().token().is_some());
    let checks: Vec<String> = log
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("checker:") || e == "event:verify")
        .collect();
    assert_eq!(checks, ["checker:pre", "checker:post", "event:verify"]);
}

#[tokio::test]
async fn test_custom_check_decides() {
    for (valid, stored) in [(true, true), (false, false)] {
        let log = CallLog::new();
        let authenticator = MockAuthenticator::new("custom", &log)
            .check(CredentialCheck::Custom)
            .custom_valid(valid);
        let manager = manager_with_matcher(authenticator, RecordingMatcher::new(true, &log), &log);
        let mut request = get("/");

        manager.supports(&mut request);
        manager.authenticate(&mut request).await.unwrap();

        assert_eq!(log.count("custom:check_credentials"), 1);
        assert_eq!(request.token_storage().token().is_some(), stored);
    }
}

#[tokio::test]
async fn test_outdated_hash_is_migrated() {
    let log = CallLog::new();
    let users = Arc::new(InMemoryUserProvider::new());
    users.insert(User::new("alice").with_password("old-hash"));

    let matcher = Arc::new(RecordingMatcher::new(true, &log).needing_rehash());
    let mut events = helpers::dispatcher(matcher.clone(), &log);
    events.register(Arc::new(PasswordMigrationListener::new(matcher, users.clone())));
    let authenticators: Vec<Arc<dyn Authenticator>> = vec![Arc::new(password_login(
        "secret",
        User::new("alice").with_password("old-hash"),
        &log,
    ))];
    let manager = AuthenticatorManager::new("main", authenticators, Arc::new(events)).unwrap();
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    let stored = users.load_user("alice").await.unwrap().unwrap();
    assert_eq!(stored.password(), Some("rehashed:secret"));
}
