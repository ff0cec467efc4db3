//! User lookup and password upgrade collaborators.

use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use warden_core::config::UserConfig;
use warden_entity::user::{User, UserStatus};

use crate::error::SecurityResult;

/// Loads users by identifier.
#[async_trait]
pub trait UserProvider: Send + Sync + fmt::Debug {
    /// The user with the given identifier, if any.
    async fn load_user(&self, identifier: &str) -> SecurityResult<Option<User>>;
}

/// Persists a rehashed password.
#[async_trait]
pub trait PasswordUpgrader: Send + Sync + fmt::Debug {
    /// Replace the stored hash of `user` with `new_hash`.
    async fn upgrade_password(&self, user: &User, new_hash: &str) -> SecurityResult<()>;
}

/// Users kept in process memory, typically declared in configuration.
#[derive(Debug, Default)]
pub struct InMemoryUserProvider {
    users: DashMap<String, User>,
}

impl InMemoryUserProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured users.
    pub fn from_config(users: &[UserConfig]) -> Self {
        let provider = Self::new();
        for entry in users {
            let mut user = User::new(&entry.identifier)
                .with_roles(entry.roles.iter().cloned())
                .with_status(UserStatus::from_flags(entry.enabled, entry.locked));
            if let Some(hash) = &entry.password_hash {
                user.set_password(hash.clone());
            }
            provider.insert(user);
        }
        provider
    }

    /// Add or replace a user.
    pub fn insert(&self, user: User) {
        self.users.insert(user.identifier.clone(), user);
    }

    /// A copy of the stored user.
    pub fn get(&self, identifier: &str) -> Option<User> {
        self.users.get(identifier).map(|entry| entry.value().clone())
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the provider holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserProvider for InMemoryUserProvider {
    async fn load_user(&self, identifier: &str) -> SecurityResult<Option<User>> {
        Ok(self.users.get(identifier).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl PasswordUpgrader for InMemoryUserProvider {
    async fn upgrade_password(&self, user: &User, new_hash: &str) -> SecurityResult<()> {
        if let Some(mut stored) = self.users.get_mut(&user.identifier) {
            stored.set_password(new_hash);
            info!(user = %user.identifier, "Stored password hash upgraded");
        }
        Ok(())
    }
}
