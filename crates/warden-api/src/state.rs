//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::firewall::Firewall;
use warden_core::config::AppConfig;

use crate::session::SessionStore;

/// Shared dependencies, passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// The firewall guarding every route
    pub firewall: Arc<Firewall>,
    /// Server-side sessions for stateful firewalls
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Bundle configuration and an assembled firewall with an empty session store.
    pub fn new(config: AppConfig, firewall: Firewall) -> Self {
        Self {
            config: Arc::new(config),
            firewall: Arc::new(firewall),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
