//! Remember-me: long-lived cookies that re-authenticate returning users.

pub mod claims;
pub mod signed;

use std::fmt;

use async_trait::async_trait;
use http::{HeaderValue, header};
use tracing::warn;

use warden_entity::token::Token;
use warden_entity::user::User;

use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::request::{Request, Response};

pub use claims::RememberMeClaims;
pub use signed::SignedRememberMeService;

/// Issues, validates and clears remember-me cookies.
#[async_trait]
pub trait RememberMeService: Send + Sync + fmt::Debug {
    /// Name of the cookie this service reads and writes.
    fn cookie_name(&self) -> &str;

    /// Resolve the user behind the cookie segments in `credentials`.
    ///
    /// Any cookie that does not lead to a current user yields `None`.
    async fn perform_login(&self, credentials: &Credentials) -> SecurityResult<Option<User>>;

    /// Issue a cookie for a user who just logged in.
    async fn login_success(
        &self,
        request: &mut Request,
        response: Option<&mut Response>,
        token: &Token,
    ) -> SecurityResult<()>;

    /// A remember-me login failed; the cookie must not be tried again.
    async fn login_fail(&self, request: &mut Request, error: &AuthenticationError);

    /// The user logged out.
    async fn logout(&self, request: &mut Request, response: Option<&mut Response>);
}

/// A pending change to the remember-me cookie.
///
/// When no response exists yet the change is parked in the request
/// extensions and the host applies it to whatever response it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RememberMeCookie {
    /// Set the cookie.
    Set {
        /// Cookie name.
        name: String,
        /// Cookie value.
        value: String,
        /// Lifetime in seconds.
        max_age: u64,
        /// Cookie path.
        path: String,
        /// HTTPS only.
        secure: bool,
        /// Hidden from scripts.
        http_only: bool,
    },
    /// Expire the cookie.
    Clear {
        /// Cookie name.
        name: String,
        /// Cookie path.
        path: String,
    },
}

impl RememberMeCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        match self {
            Self::Set {
                name,
                value,
                max_age,
                path,
                secure,
                http_only,
            } => {
                let mut cookie = format!("{name}={value}; Max-Age={max_age}; Path={path}; SameSite=Lax");
                if *secure {
                    cookie.push_str("; Secure");
                }
                if *http_only {
                    cookie.push_str("; HttpOnly");
                }
                cookie
            }
            Self::Clear { name, path } => format!("{name}=; Max-Age=0; Path={path}"),
        }
    }

    /// Append the cookie to a response.
    pub fn apply<B>(&self, response: &mut http::Response<B>) {
        match HeaderValue::from_str(&self.header_value()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Remember-me cookie is not a valid header value"),
        }
    }

    /// Write onto `response` when there is one, else park it on the request.
    pub fn write(self, request: &mut Request, response: Option<&mut Response>) {
        match response {
            Some(response) => self.apply(response),
            None => {
                request.extensions_mut().insert(self);
            }
        }
    }
}

/// Whether a raw cookie value has the shape of a remember-me cookie.
pub fn is_well_formed(value: &str) -> bool {
    let segments: Vec<&str> = value.split('.').collect();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}
