//! Integration tests for authenticator selection and execution.

mod helpers;

use std::sync::Arc;

use http::StatusCode;

use helpers::{CallLog, CredentialsBehavior, MockAuthenticator, get, manager};
use warden_auth::authenticator::{AnonymousAuthenticator, Authenticator, CredentialCheck, Support};
use warden_auth::credentials::Credentials;
use warden_auth::error::{AuthenticationError, SecurityError};
use warden_auth::events::EventDispatcher;
use warden_auth::manager::{AuthenticatorManager, TokenOutcome};
use warden_auth::provider::{PreAuthenticationToken, ProviderToken};
use warden_auth::refresh::{FINGERPRINT_ATTRIBUTE, TokenRefresher};
use warden_auth::user_provider::InMemoryUserProvider;
use warden_auth::verifier::DefaultUserChecker;
use warden_entity::token::{Token, TokenKind};
use warden_entity::user::{ANONYMOUS_IDENTIFIER, User, UserStatus};

#[tokio::test]
async fn test_no_support_executes_nothing() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log).support(Support::NotSupported),
            MockAuthenticator::new("b", &log).support(Support::NotSupported),
        ],
        &log,
    );
    let mut request = get("/");

    assert_eq!(manager.supports(&mut request), Support::NotSupported);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.entries(), ["a:supports", "b:supports"]);
}

#[tokio::test]
async fn test_single_success_stores_token_and_stops() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log),
            MockAuthenticator::new("b", &log),
        ],
        &log,
    );
    let mut request = get("/");

    assert_eq!(manager.supports(&mut request), Support::Supported);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    let token = request.token_storage().token().expect("token stored");
    assert_eq!(token.user_identifier(), "alice");
    assert_eq!(token.authenticator(), Some("a"));
    assert_eq!(token.kind(), TokenKind::PostAuthentication);

    assert_eq!(log.count("a:success"), 1);
    assert_eq!(log.count("b:get_credentials"), 0);
    assert_eq!(log.count("b:get_user"), 0);
    assert_eq!(log.count("event:interactive_login"), 1);
    assert_eq!(log.count("event:login_success"), 1);
}

#[tokio::test]
async fn test_failure_response_stops_later_candidates() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log)
                .user(None)
                .failure_status(StatusCode::UNAUTHORIZED),
            MockAuthenticator::new("b", &log),
        ],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert_eq!(response.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.count("b:get_credentials"), 0);
}

#[tokio::test]
async fn test_failure_without_response_still_ends_the_run() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log).user(None),
            MockAuthenticator::new("b", &log),
        ],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.count("b:get_credentials"), 0);
    assert_eq!(log.count("event:login_failure(BadCredentials)"), 1);
}

#[tokio::test]
async fn test_success_response_is_returned() {
    let log = CallLog::new();
    let manager = manager(
        vec![MockAuthenticator::new("a", &log).success_status(StatusCode::FOUND)],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert_eq!(response.unwrap().status(), StatusCode::FOUND);
    assert!(request.token_storage().token().is_some());
}

#[tokio::test]
async fn test_supports_is_idempotent() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log).support(Support::SupportedLazily),
            MockAuthenticator::new("b", &log).support(Support::NotSupported),
            MockAuthenticator::new("c", &log),
        ],
        &log,
    );
    let mut request = get("/");

    let first = manager.supports(&mut request);
    let second = manager.supports(&mut request);

    assert_eq!(first, Support::Supported);
    assert_eq!(first, second);
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.count("a:get_credentials"), 0);
}

#[tokio::test]
async fn test_all_lazy_candidates_report_lazy_support() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log).support(Support::SupportedLazily),
            MockAuthenticator::new("b", &log).support(Support::SupportedLazily),
        ],
        &log,
    );
    let mut request = get("/");

    assert_eq!(manager.supports(&mut request), Support::SupportedLazily);
}

#[tokio::test]
async fn test_lazy_candidate_without_credentials_is_skipped() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log)
                .support(Support::SupportedLazily)
                .credentials(CredentialsBehavior::Absent),
            MockAuthenticator::new("b", &log),
        ],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    let token = request.token_storage().token().expect("token stored");
    assert_eq!(token.authenticator(), Some("b"));
    assert_eq!(log.count("a:get_user"), 0);
}

#[tokio::test]
async fn test_eager_candidate_without_credentials_is_invalid_usage() {
    let log = CallLog::new();
    let manager = manager(
        vec![MockAuthenticator::new("a", &log).credentials(CredentialsBehavior::Absent)],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let error = manager.authenticate(&mut request).await.unwrap_err();

    assert!(matches!(error, SecurityError::InvalidUsage(_)));
}

#[tokio::test]
async fn test_credential_extraction_error_goes_to_failure_hook() {
    let log = CallLog::new();
    let manager = manager(
        vec![
            MockAuthenticator::new("a", &log)
                .credentials(CredentialsBehavior::Fail(AuthenticationError::Custom(
                    "Invalid basic authentication header".into(),
                )))
                .failure_status(StatusCode::UNAUTHORIZED),
            MockAuthenticator::new("b", &log),
        ],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert_eq!(response.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(log.count("a:get_user"), 0);
    assert_eq!(log.count("b:get_credentials"), 0);
}

#[tokio::test]
async fn test_authenticate_without_supports_does_nothing() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");

    let response = manager.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    assert!(request.token_storage().token().is_none());
}

#[tokio::test]
async fn test_candidates_from_another_firewall_are_ignored() {
    let log = CallLog::new();
    let admin = {
        let authenticators: Vec<Arc<dyn Authenticator>> =
            vec![Arc::new(MockAuthenticator::new("admin.a", &log))];
        AuthenticatorManager::new("admin", authenticators, Arc::new(EventDispatcher::new())).unwrap()
    };
    let main = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");

    admin.supports(&mut request);
    let response = main.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.count("admin.a:get_credentials"), 0);
}

#[tokio::test]
async fn test_anonymous_scenario() {
    let authenticators: Vec<Arc<dyn Authenticator>> =
        vec![Arc::new(AnonymousAuthenticator::new("main"))];
    let log = CallLog::new();
    let events = helpers::dispatcher(Arc::new(helpers::RecordingMatcher::new(true, &log)), &log);
    let manager = AuthenticatorManager::new("main", authenticators, Arc::new(events)).unwrap();
    let mut request = get("/");

    assert_eq!(manager.supports(&mut request), Support::Supported);
    let response = manager.authenticate(&mut request).await.unwrap();

    assert!(response.is_none());
    let token = request.token_storage().token().expect("token stored");
    assert_eq!(token.user_identifier(), ANONYMOUS_IDENTIFIER);
    assert!(token.roles().is_empty());
    assert_eq!(token.kind(), TokenKind::Anonymous);
}

#[tokio::test]
async fn test_unknown_user_is_hidden_as_bad_credentials() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log).user(None)], &log);
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(log.count("a:failure(BadCredentials)"), 1);
}

#[tokio::test]
async fn test_unknown_user_is_reported_when_not_hidden() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log).user(None)], &log)
        .with_hide_user_not_found(false);
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(
        log.count("a:failure(UserNotFound { identifier: \"alice\" })"),
        1
    );
}

#[tokio::test]
async fn test_disabled_account_fails_before_verification() {
    let log = CallLog::new();
    let disabled = User::new("alice").with_status(UserStatus::Inactive);
    let manager = manager(
        vec![MockAuthenticator::new("a", &log).user(Some(disabled))],
        &log,
    )
    .with_hide_user_not_found(false);
    let mut request = get("/");

    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();

    assert_eq!(log.count("a:failure(AccountDisabled)"), 1);
    assert_eq!(log.count("checker:post"), 0);
    assert!(request.token_storage().token().is_none());
}

#[tokio::test]
async fn test_credentials_are_erased_before_storage() {
    let log = CallLog::new();
    let user = User::new("alice").with_password("$argon2id$stored");
    let manager = manager(
        vec![MockAuthenticator::new("a", &log).user(Some(user.clone()))],
        &log,
    );
    let mut request = get("/");
    manager.supports(&mut request);
    manager.authenticate(&mut request).await.unwrap();
    let erased = request.token_storage().token().unwrap();

    let keeping = helpers::manager(
        vec![MockAuthenticator::new("a", &log).user(Some(user))],
        &log,
    )
    .with_erase_credentials(false);
    let mut request = get("/");
    keeping.supports(&mut request);
    keeping.authenticate(&mut request).await.unwrap();
    let kept = request.token_storage().token().unwrap();

    assert!(erased.user().password().is_none());
    assert_eq!(kept.user().password(), Some("$argon2id$stored"));
}

#[tokio::test]
async fn test_undeclared_credential_check_is_misconfigured() {
    let log = CallLog::new();
    let manager = manager(
        vec![MockAuthenticator::new("a", &log).check(CredentialCheck::Undeclared)],
        &log,
    );
    let mut request = get("/");

    manager.supports(&mut request);
    let error = manager.authenticate(&mut request).await.unwrap_err();

    assert!(matches!(error, SecurityError::Misconfigured { .. }));
}

#[tokio::test]
async fn test_duplicate_authenticator_keys_are_rejected() {
    let log = CallLog::new();
    let authenticators: Vec<Arc<dyn Authenticator>> = vec![
        Arc::new(MockAuthenticator::new("a", &log)),
        Arc::new(MockAuthenticator::new("a", &log)),
    ];

    let result = AuthenticatorManager::new("main", authenticators, Arc::new(EventDispatcher::new()));

    assert!(matches!(result, Err(SecurityError::Misconfigured { .. })));
}

#[tokio::test]
async fn test_authenticate_user_skips_verification() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");

    manager
        .authenticate_user(User::new("bob"), "a", &mut request)
        .await
        .unwrap();

    let token = request.token_storage().token().unwrap();
    assert_eq!(token.user_identifier(), "bob");
    assert_eq!(log.count("checker:pre"), 0);
    assert_eq!(log.count("event:login_success"), 1);
}

#[tokio::test]
async fn test_authenticate_user_with_unknown_key_is_invalid_usage() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");

    let error = manager
        .authenticate_user(User::new("bob"), "missing", &mut request)
        .await
        .unwrap_err();

    assert!(matches!(error, SecurityError::InvalidUsage(_)));
}

#[tokio::test]
async fn test_authenticate_token_with_pre_authentication() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");
    let pre = PreAuthenticationToken::new(Credentials::new().with_identifier("alice"), "a", "main");

    let outcome = manager
        .authenticate_token(&mut request, ProviderToken::PreAuthentication(pre))
        .await
        .unwrap();

    assert!(matches!(outcome, TokenOutcome::Authenticated(ref t) if t.user_identifier() == "alice"));
    assert!(request.token_storage().token().is_some());
}

#[tokio::test]
async fn test_authenticate_token_with_unknown_authenticator_fails() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");
    let pre = PreAuthenticationToken::new(Credentials::new(), "gone", "main");

    let outcome = manager
        .authenticate_token(&mut request, ProviderToken::PreAuthentication(pre))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        TokenOutcome::Failed(AuthenticationError::AuthenticatorNotFound { .. })
    ));
}

#[tokio::test]
async fn test_expired_token_logs_out() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");
    let mut token = Token::new(TokenKind::PostAuthentication, User::new("alice"), "main", vec![]);
    request.token_storage().set_token(Some(token.clone()));
    token.deauthenticate();

    let outcome = manager
        .authenticate_token(&mut request, ProviderToken::Established(token))
        .await
        .unwrap();

    assert!(matches!(outcome, TokenOutcome::LoggedOut(None)));
    assert!(request.token_storage().token().is_none());
    assert_eq!(log.count("event:logout"), 1);
}

#[tokio::test]
async fn test_established_token_of_disabled_user_logs_out() {
    let log = CallLog::new();
    let users = Arc::new(InMemoryUserProvider::new());
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log)
        .with_token_refresher(TokenRefresher::new(users.clone(), Arc::new(DefaultUserChecker)));
    let alice = User::new("alice").with_password("hash-v1");
    users.insert(alice.clone());

    let mut request = get("/");
    manager
        .authenticate_user(alice.clone(), "a", &mut request)
        .await
        .unwrap();
    let token = request.token_storage().token().unwrap();
    assert!(token.attribute(FINGERPRINT_ATTRIBUTE).is_some());
    assert!(token.user().password().is_none());

    let mut next = get("/");
    let outcome = manager
        .authenticate_token(&mut next, ProviderToken::Established(token.clone()))
        .await
        .unwrap();
    assert!(matches!(outcome, TokenOutcome::Authenticated(_)));

    users.insert(alice.with_status(UserStatus::Inactive));
    let mut after = get("/");
    after.token_storage().set_token(Some(token.clone()));
    let outcome = manager
        .authenticate_token(&mut after, ProviderToken::Established(token))
        .await
        .unwrap();

    assert!(matches!(outcome, TokenOutcome::LoggedOut(_)));
    assert!(after.token_storage().token().is_none());
}

#[tokio::test]
async fn test_token_of_foreign_kind_is_rejected() {
    let log = CallLog::new();
    let manager = manager(vec![MockAuthenticator::new("a", &log)], &log);
    let mut request = get("/");
    let token = Token::new(TokenKind::Anonymous, User::anonymous(), "main", vec![]);

    let error = manager
        .authenticate_token(&mut request, ProviderToken::Established(token))
        .await
        .unwrap_err();

    assert!(matches!(error, SecurityError::InvalidUsage(_)));
}
