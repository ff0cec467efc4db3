//! Shared test doubles for pipeline tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use parking_lot::Mutex;

use warden_auth::authenticator::{Authenticator, CredentialCheck, Support};
use warden_auth::credentials::Credentials;
use warden_auth::error::{AuthenticationError, SecurityResult};
use warden_auth::events::{
    AuthListener, EventDispatcher, InteractiveLoginEvent, LoginFailureEvent, LoginSuccessEvent,
    LogoutEvent,
};
use warden_auth::manager::AuthenticatorManager;
use warden_auth::password::PasswordMatcher;
use warden_auth::request::{Request, Response};
use warden_auth::verifier::{
    CredentialsVerifier, DefaultUserChecker, UserChecker, UserCheckerListener, VerificationEvent,
};
use warden_entity::user::User;

/// Ordered record of calls made on test doubles.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}

/// What a mock authenticator hands back from `get_credentials`.
#[derive(Debug, Clone)]
pub enum CredentialsBehavior {
    Present(Credentials),
    Absent,
    Fail(AuthenticationError),
}

/// Scriptable authenticator that records every call.
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    key: String,
    support: Support,
    credentials: CredentialsBehavior,
    user: Option<User>,
    check: CredentialCheck,
    custom_valid: bool,
    success_status: Option<StatusCode>,
    failure_status: Option<StatusCode>,
    log: CallLog,
}

impl MockAuthenticator {
    /// A token-checked authenticator that supports every request and resolves `user`.
    pub fn new(key: &str, log: &CallLog) -> Self {
        Self {
            key: key.to_string(),
            support: Support::Supported,
            credentials: CredentialsBehavior::Present(Credentials::new().with_identifier("alice")),
            user: Some(User::new("alice").with_roles(["ROLE_USER"])),
            check: CredentialCheck::Token,
            custom_valid: true,
            success_status: None,
            failure_status: None,
            log: log.clone(),
        }
    }

    pub fn support(mut self, support: Support) -> Self {
        self.support = support;
        self
    }

    pub fn credentials(mut self, credentials: CredentialsBehavior) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    pub fn check(mut self, check: CredentialCheck) -> Self {
        self.check = check;
        self
    }

    pub fn custom_valid(mut self, valid: bool) -> Self {
        self.custom_valid = valid;
        self
    }

    pub fn success_status(mut self, status: StatusCode) -> Self {
        self.success_status = Some(status);
        self
    }

    pub fn failure_status(mut self, status: StatusCode) -> Self {
        self.failure_status = Some(status);
        self
    }

    fn record(&self, call: &str) {
        self.log.push(format!("{}:{call}", self.key));
    }
}

fn response(status: StatusCode) -> Response {
    http::Response::builder()
        .status(status)
        .body(String::new())
        .expect("valid response")
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, _request: &Request) -> Support {
        self.record("supports");
        self.support
    }

    fn get_credentials(&self, _request: &Request) -> SecurityResult<Option<Credentials>> {
        self.record("get_credentials");
        match &self.credentials {
            CredentialsBehavior::Present(credentials) => Ok(Some(credentials.clone())),
            CredentialsBehavior::Absent => Ok(None),
            CredentialsBehavior::Fail(error) => Err(error.clone().into()),
        }
    }

    async fn get_user(&self, _credentials: &Credentials) -> SecurityResult<Option<User>> {
        self.record("get_user");
        Ok(self.user.clone())
    }

    fn credential_check(&self) -> CredentialCheck {
        self.check
    }

    async fn check_credentials(&self, _credentials: &Credentials, _user: &User) -> SecurityResult<bool> {
        self.record("check_credentials");
        Ok(self.custom_valid)
    }

    async fn on_authentication_success(
        &self,
        _request: &mut Request,
        _token: &warden_entity::token::Token,
        _firewall: &str,
    ) -> SecurityResult<Option<Response>> {
        self.record("success");
        Ok(self.success_status.map(response))
    }

    async fn on_authentication_failure(
        &self,
        _request: &mut Request,
        error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        self.record(&format!("failure({error:?})"));
        Ok(self.failure_status.map(response))
    }
}

/// Password matcher with a fixed answer that records its calls.
#[derive(Debug, Clone)]
pub struct RecordingMatcher {
    answer: bool,
    rehash: bool,
    log: CallLog,
}

impl RecordingMatcher {
    pub fn new(answer: bool, log: &CallLog) -> Self {
        Self {
            answer,
            rehash: false,
            log: log.clone(),
        }
    }

    pub fn needing_rehash(mut self) -> Self {
        self.rehash = true;
        self
    }
}

impl PasswordMatcher for RecordingMatcher {
    fn matches(&self, stored_hash: &str, presented: &str, _salt: Option<&str>) -> SecurityResult<bool> {
        self.log.push(format!("matcher:{stored_hash}:{presented}"));
        Ok(self.answer)
    }

    fn needs_rehash(&self, _stored_hash: &str) -> bool {
        self.rehash
    }

    fn hash(&self, plain: &str) -> SecurityResult<String> {
        Ok(format!("rehashed:{plain}"))
    }
}

/// User checker that records both phases before delegating to the default checks.
#[derive(Debug, Clone)]
pub struct RecordingChecker {
    log: CallLog,
}

impl RecordingChecker {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl UserChecker for RecordingChecker {
    fn check_pre_auth(&self, user: &User) -> SecurityResult<()> {
        self.log.push("checker:pre");
        DefaultUserChecker.check_pre_auth(user)
    }

    fn check_post_auth(&self, user: &User) -> SecurityResult<()> {
        self.log.push("checker:post");
        DefaultUserChecker.check_post_auth(user)
    }
}

/// Listener that records every notification it receives.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    log: CallLog,
}

impl RecordingListener {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

#[async_trait]
impl AuthListener for RecordingListener {
    fn name(&self) -> &str {
        "recording"
    }

    fn priority(&self) -> i32 {
        2048
    }

    async fn on_verify_credentials(&self, _event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        self.log.push("event:verify");
        Ok(())
    }

    async fn on_interactive_login(&self, _event: &mut InteractiveLoginEvent<'_>) -> SecurityResult<()> {
        self.log.push("event:interactive_login");
        Ok(())
    }

    async fn on_login_success(&self, _event: &mut LoginSuccessEvent<'_>) -> SecurityResult<()> {
        self.log.push("event:login_success");
        Ok(())
    }

    async fn on_login_failure(&self, event: &mut LoginFailureEvent<'_>) -> SecurityResult<()> {
        self.log.push(format!("event:login_failure({:?})", event.error));
        Ok(())
    }

    async fn on_logout(&self, _event: &mut LogoutEvent<'_>) -> SecurityResult<()> {
        self.log.push("event:logout");
        Ok(())
    }
}

/// Dispatcher with the standard verification chain plus a recording listener.
pub fn dispatcher(matcher: Arc<dyn PasswordMatcher>, log: &CallLog) -> EventDispatcher {
    let checker: Arc<dyn UserChecker> = Arc::new(RecordingChecker::new(log));
    EventDispatcher::new()
        .with_listener(Arc::new(UserCheckerListener::pre(checker.clone())))
        .with_listener(Arc::new(CredentialsVerifier::new(matcher)))
        .with_listener(Arc::new(UserCheckerListener::post(checker)))
        .with_listener(Arc::new(RecordingListener::new(log)))
}

/// Manager on firewall `main` over `authenticators`, with a matcher that accepts everything.
pub fn manager(authenticators: Vec<MockAuthenticator>, log: &CallLog) -> AuthenticatorManager {
    let events = dispatcher(Arc::new(RecordingMatcher::new(true, log)), log);
    let authenticators = authenticators
        .into_iter()
        .map(|a| Arc::new(a) as Arc<dyn Authenticator>)
        .collect();
    AuthenticatorManager::new("main", authenticators, Arc::new(events))
        .expect("unique authenticator keys")
}

pub fn get(path: &str) -> Request {
    Request::new(Method::GET, path.parse().expect("valid uri"))
}
