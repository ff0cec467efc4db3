//! Password matching.

pub mod hasher;

use std::fmt;

use crate::error::SecurityResult;

pub use hasher::Argon2PasswordHasher;

/// Compares a presented password with a stored hash.
pub trait PasswordMatcher: Send + Sync + fmt::Debug {
    /// Whether `presented` matches `stored_hash`.
    ///
    /// `salt` is only used by schemes that keep the salt outside the hash.
    fn matches(&self, stored_hash: &str, presented: &str, salt: Option<&str>) -> SecurityResult<bool>;

    /// Whether `stored_hash` was produced with outdated parameters.
    fn needs_rehash(&self, _stored_hash: &str) -> bool {
        false
    }

    /// Hash a plaintext password with the current parameters.
    fn hash(&self, plain: &str) -> SecurityResult<String>;
}
