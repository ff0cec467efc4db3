//! In-process server-side sessions keyed by a cookie.

use dashmap::DashMap;
use tracing::debug;

use warden_auth::session::Session;
use warden_entity::token::{Token, TokenKind};

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "WARDEN_SESSION";

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    token: Option<Token>,
}

/// Session data and the token authenticated within it.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: DashMap<String, Entry>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The session with `id` and its stored token.
    pub fn load(&self, id: &str) -> Option<(Session, Option<Token>)> {
        self.entries
            .get(id)
            .map(|entry| (entry.session.clone(), entry.token.clone()))
    }

    /// Store `session` under its current id.
    ///
    /// Anonymous tokens are not kept; they are recreated on every request.
    pub fn save(&self, session: Session, token: Option<Token>) {
        let token = token.filter(|t| t.kind() != TokenKind::Anonymous);
        self.entries
            .insert(session.id().to_string(), Entry { session, token });
    }

    /// Drop the session with `id`.
    pub fn remove(&self, id: &str) {
        if self.entries.remove(id).is_some() {
            debug!(session = %id, "Session removed");
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `Set-Cookie` value for the session cookie.
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
