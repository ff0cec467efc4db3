//! `AuthToken` extractor: the token the firewall authenticated for this request.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use warden_auth::session::Session;
use warden_core::error::AppError;
use warden_entity::token::Token;

use crate::error::ApiError;

/// Token of a fully authenticated (non-anonymous) user.
#[derive(Debug, Clone)]
pub struct AuthToken(pub Token);

impl std::ops::Deref for AuthToken {
    type Target = Token;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Token>() {
            Some(token) if !token.user().is_anonymous() => Ok(AuthToken(token.clone())),
            _ => Err(AppError::authentication("Full authentication is required").into()),
        }
    }
}

/// The session resumed by the firewall, if the firewall is stateful.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(parts.extensions.get::<Session>().cloned()))
    }
}
