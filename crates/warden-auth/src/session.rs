//! Minimal HTTP session model and session fixation protection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use warden_core::config::SessionFixationStrategy;

/// Server-side session attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    data: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Start a new session with a random id.
    pub fn new() -> Self {
        Self {
            id: new_session_id(),
            data: HashMap::new(),
        }
    }

    /// Resume a session with a known id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: HashMap::new(),
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read a value.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Store a value.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the session holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the data to a fresh id.
    pub fn migrate(&mut self) {
        self.id = new_session_id();
    }

    /// Drop all data and take a fresh id.
    pub fn invalidate(&mut self) {
        self.data.clear();
        self.id = new_session_id();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Applies a [`SessionFixationStrategy`] to a session after login.
#[derive(Debug, Clone, Copy)]
pub struct SessionAuthenticationStrategy {
    strategy: SessionFixationStrategy,
}

impl SessionAuthenticationStrategy {
    /// Wrap a strategy.
    pub fn new(strategy: SessionFixationStrategy) -> Self {
        Self { strategy }
    }

    /// The wrapped strategy.
    pub fn strategy(&self) -> SessionFixationStrategy {
        self.strategy
    }

    /// Protect the session against fixation.
    pub fn on_authentication(&self, session: &mut Session) {
        let previous = session.id().to_string();
        match self.strategy {
            SessionFixationStrategy::None => return,
            SessionFixationStrategy::Migrate => session.migrate(),
            SessionFixationStrategy::Invalidate => session.invalidate(),
        }
        debug!(
            previous_id = %previous,
            new_id = %session.id(),
            strategy = ?self.strategy,
            "Session id regenerated after login"
        );
    }
}
