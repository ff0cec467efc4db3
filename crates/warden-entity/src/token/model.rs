//! Authenticated security token.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// How the token came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Issued by an authenticator after verifying credentials.
    PostAuthentication,
    /// Issued to requests that present no credentials.
    Anonymous,
    /// Issued from a remember-me cookie.
    RememberMe,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostAuthentication => write!(f, "post_authentication"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::RememberMe => write!(f, "remember_me"),
        }
    }
}

/// The authenticated principal installed in token storage.
///
/// Tokens are only ever constructed authenticated. A token may later be
/// deauthenticated (e.g. when the underlying account changed), never
/// re-authenticated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    user: User,
    firewall: String,
    roles: Vec<String>,
    kind: TokenKind,
    authenticator: Option<String>,
    authenticated: bool,
    attributes: HashMap<String, serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl Token {
    /// Create an authenticated token.
    pub fn new(kind: TokenKind, user: User, firewall: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user,
            firewall: firewall.into(),
            roles,
            kind,
            authenticator: None,
            authenticated: true,
            attributes: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Record which authenticator issued the token.
    pub fn with_authenticator(mut self, key: impl Into<String>) -> Self {
        self.authenticator = Some(key.into());
        self
    }

    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Shortcut for the user's identifier.
    pub fn user_identifier(&self) -> &str {
        &self.user.identifier
    }

    /// Name of the firewall the token belongs to.
    pub fn firewall(&self) -> &str {
        &self.firewall
    }

    /// Roles granted to this token.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether the token carries the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// How the token was issued.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Key of the issuing authenticator, if recorded.
    pub fn authenticator(&self) -> Option<&str> {
        self.authenticator.as_deref()
    }

    /// Whether the token still counts as authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Mark the token as no longer authenticated.
    pub fn deauthenticate(&mut self) {
        self.authenticated = false;
    }

    /// When the token was issued.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read a free-form attribute.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Set a free-form attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Wipe secret material carried by the token.
    pub fn erase_credentials(&mut self) {
        self.user.erase_credentials();
    }
}
