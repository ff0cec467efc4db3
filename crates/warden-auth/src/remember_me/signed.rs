//! Remember-me cookies signed as HS256 JWTs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use warden_core::config::RememberMeConfig;
use warden_core::error::AppError;
use warden_entity::token::Token;
use warden_entity::user::User;

use super::{RememberMeClaims, RememberMeCookie, RememberMeService};
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::request::{Request, Response};
use crate::user_provider::UserProvider;

/// Stateless remember-me service.
///
/// The cookie value is a signed JWT whose three segments are exactly the
/// segments the remember-me authenticator extracts. Cookies die when they
/// expire or when the user's stored password changes.
#[derive(Clone)]
pub struct SignedRememberMeService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: RememberMeConfig,
    users: Arc<dyn UserProvider>,
}

impl std::fmt::Debug for SignedRememberMeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRememberMeService")
            .field("cookie_name", &self.config.cookie_name)
            .field("lifetime_seconds", &self.config.lifetime_seconds)
            .field("validation", &self.validation)
            .finish()
    }
}

impl SignedRememberMeService {
    /// Creates a service from remember-me configuration.
    pub fn new(config: &RememberMeConfig, users: Arc<dyn UserProvider>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config: config.clone(),
            users,
        }
    }

    /// Sign a cookie value for `user`.
    pub fn issue(&self, user: &User) -> SecurityResult<String> {
        let claims = RememberMeClaims::new(user, Utc::now().timestamp(), self.config.lifetime_seconds);
        let value = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign remember-me cookie: {e}")))?;
        Ok(value)
    }

    fn clear_cookie(&self) -> RememberMeCookie {
        RememberMeCookie::Clear {
            name: self.config.cookie_name.clone(),
            path: self.config.path.clone(),
        }
    }
}

#[async_trait]
impl RememberMeService for SignedRememberMeService {
    fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    async fn perform_login(&self, credentials: &Credentials) -> SecurityResult<Option<User>> {
        let segments = credentials.segments();
        if segments.len() != 3 {
            debug!(segments = segments.len(), "Remember-me cookie has the wrong shape");
            return Ok(None);
        }

        let raw = segments.join(".");
        let claims = match decode::<RememberMeClaims>(&raw, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Remember-me cookie rejected");
                return Ok(None);
            }
        };

        let Some(user) = self.users.load_user(&claims.sub).await? else {
            debug!(user = %claims.sub, "Remember-me cookie names an unknown user");
            return Ok(None);
        };

        if !claims.matches(&user) {
            debug!(user = %claims.sub, "Remember-me cookie predates a credential change");
            return Ok(None);
        }

        Ok(Some(user))
    }

    async fn login_success(
        &self,
        request: &mut Request,
        response: Option<&mut Response>,
        token: &Token,
    ) -> SecurityResult<()> {
        // The token's copy of the user may have had its credentials erased.
        let Some(user) = self.users.load_user(token.user_identifier()).await? else {
            debug!(user = %token.user_identifier(), "No provider entry; remember-me cookie not issued");
            return Ok(());
        };

        let cookie = RememberMeCookie::Set {
            name: self.config.cookie_name.clone(),
            value: self.issue(&user)?,
            max_age: self.config.lifetime_seconds,
            path: self.config.path.clone(),
            secure: self.config.secure,
            http_only: self.config.http_only,
        };
        cookie.write(request, response);

        debug!(user = %user.identifier, "Remember-me cookie issued");
        Ok(())
    }

    async fn login_fail(&self, request: &mut Request, error: &AuthenticationError) {
        debug!(error = %error, "Remember-me login failed; clearing cookie");
        self.clear_cookie().write(request, None);
    }

    async fn logout(&self, request: &mut Request, response: Option<&mut Response>) {
        self.clear_cookie().write(request, response);
    }
}
