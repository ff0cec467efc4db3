//! Token storage: where the authenticated token lives for the current request.

use std::fmt;

use parking_lot::RwLock;

use warden_entity::token::Token;

/// Holds the token of the request being processed.
pub trait TokenStorage: Send + Sync + fmt::Debug {
    /// The currently stored token.
    fn token(&self) -> Option<Token>;

    /// Replace the stored token; `None` clears it.
    fn set_token(&self, token: Option<Token>);
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<Token>>,
}

impl MemoryTokenStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    fn set_token(&self, token: Option<Token>) {
        *self.token.write() = token;
    }
}
