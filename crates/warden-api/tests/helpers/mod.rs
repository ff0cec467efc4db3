//! Shared test helpers for HTTP tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use argon2::Params;
use axum::Router;
use axum::body::Body;
use http::{HeaderMap, HeaderName, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use warden_api::{AppState, build_app};
use warden_auth::firewall::Firewall;
use warden_auth::password::{Argon2PasswordHasher, PasswordMatcher};
use warden_entity::user::User;
use warden_core::config::{
    AccessTokenConfig, AppConfig, FirewallConfig, FormLoginConfig, HttpBasicConfig,
    RememberMeConfig, UserConfig,
};

/// `alice:secret`
pub const ALICE_BASIC: &str = "Basic YWxpY2U6c2VjcmV0";
/// `alice:wrong`
pub const ALICE_WRONG_BASIC: &str = "Basic YWxpY2U6d3Jvbmc=";
pub const ALICE_BEARER: &str = "Bearer t0k3n-alice";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router, for inspecting users and sessions
    pub state: AppState,
}

/// Captured response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("JSON body")
    }

    /// The `name=value` pair of a `Set-Cookie` header for `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
    }

    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn cheap_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::with_params(Params::new(8, 1, 1, None).expect("valid params"))
}

impl TestApp {
    /// A stateful firewall with every authenticator enabled and one user, `alice`.
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    /// Like [`TestApp::new`], with a chance to adjust the firewall configuration.
    pub fn with(adjust: impl FnOnce(&mut FirewallConfig)) -> Self {
        let hasher = cheap_hasher();
        let mut firewall = FirewallConfig {
            http_basic: Some(HttpBasicConfig::default()),
            form_login: Some(FormLoginConfig::default()),
            access_token: Some(AccessTokenConfig {
                tokens: HashMap::from([("t0k3n-alice".to_string(), "alice".to_string())]),
            }),
            remember_me: Some(RememberMeConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
                ..RememberMeConfig::default()
            }),
            users: vec![UserConfig {
                identifier: "alice".to_string(),
                password_hash: Some(hasher.hash("secret").expect("hash")),
                roles: vec!["ROLE_ADMIN".to_string()],
                enabled: true,
                locked: false,
            }],
            ..FirewallConfig::default()
        };
        adjust(&mut firewall);

        let config = AppConfig {
            firewall: firewall.clone(),
            ..AppConfig::default()
        };
        let firewall = Firewall::builder(firewall)
            .password_matcher(Arc::new(hasher))
            .build()
            .expect("valid firewall");

        let state = AppState::new(config, firewall);
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Send a request through the router.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        headers: &[(HeaderName, &str)],
        form: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("infallible router");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Replace the stored `alice` account.
    pub fn update_alice(&self, update: impl FnOnce(User) -> User) {
        let users = self.state.firewall.users();
        let alice = users.get("alice").expect("alice is configured");
        users.insert(update(alice));
    }

    /// Log `alice` in through the form and return the response.
    pub async fn form_login(&self, password: &str, remember: bool) -> TestResponse {
        let mut form = format!("_username=alice&_password={password}");
        if remember {
            form.push_str("&_remember_me=on");
        }
        self.request("POST", "/login_check", &[], Some(&form)).await
    }
}
