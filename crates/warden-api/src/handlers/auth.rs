//! Authentication handlers: current user, login form state, logout.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;

use warden_auth::authenticator::form_login::{LAST_ERROR_KEY, LAST_USERNAME_KEY};
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::{AuthToken, CurrentSession};
use crate::middleware::LogoutRequested;

/// Body of `GET /api/whoami`.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub identifier: String,
    pub roles: Vec<String>,
    pub kind: String,
    pub firewall: String,
    pub authenticator: Option<String>,
}

/// GET /api/whoami
pub async fn whoami(token: AuthToken) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        identifier: token.user_identifier().to_string(),
        roles: token.roles().to_vec(),
        kind: token.kind().to_string(),
        firewall: token.firewall().to_string(),
        authenticator: token.authenticator().map(str::to_string),
    })
}

/// Body of `GET /login`.
#[derive(Debug, Serialize)]
pub struct LoginFormResponse {
    /// Identifier of the last attempt, to prefill the form.
    pub last_username: Option<String>,
    /// Message of the last failure.
    pub error: Option<String>,
}

/// GET /login: state for rendering the login form.
pub async fn login_form(CurrentSession(session): CurrentSession) -> Json<LoginFormResponse> {
    let read = |key: &str| {
        session
            .as_ref()
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    Json(LoginFormResponse {
        last_username: read(LAST_USERNAME_KEY),
        error: read(LAST_ERROR_KEY),
    })
}

/// POST on the check path; the form login authenticator answers before this runs.
pub async fn login_check() -> ApiError {
    AppError::configuration("Login check reached the router; form login is not handling it").into()
}

/// POST /api/logout
pub async fn logout(_token: AuthToken) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, Extension(LogoutRequested))
}
