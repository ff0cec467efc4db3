//! Credentials extracted from a request.
//!
//! Credentials live for a single authentication attempt. Every secret field
//! is wrapped in [`Zeroizing`] so it is wiped when the attempt ends.

use std::collections::HashMap;
use std::fmt;

use zeroize::Zeroizing;

/// Opaque bag of whatever an authenticator pulled out of the request.
#[derive(Clone, Default)]
pub struct Credentials {
    identifier: Option<String>,
    password: Option<Zeroizing<String>>,
    values: HashMap<String, Zeroizing<String>>,
    segments: Vec<Zeroizing<String>>,
}

impl Credentials {
    /// Empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier + password pair.
    pub fn password(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new()
            .with_identifier(identifier)
            .with_password(password)
    }

    /// Set the claimed identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the presented password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Set a named secret value (e.g. a bearer token).
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), Zeroizing::new(value.into()));
        self
    }

    /// Set ordered secret segments (e.g. the parts of a remember-me cookie).
    pub fn with_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments = segments
            .into_iter()
            .map(|s| Zeroizing::new(s.into()))
            .collect();
        self
    }

    /// The claimed identifier.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The presented password.
    pub fn presented_password(&self) -> Option<&str> {
        self.password.as_deref().map(String::as_str)
    }

    /// A named secret value.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    /// Ordered secret segments.
    pub fn segments(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("segments", &self.segments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_secrets() {
        let credentials = Credentials::password("alice", "hunter2")
            .with_value("access_token", "tok_123")
            .with_segments(["h", "p", "s"]);
        let rendered = format!("{credentials:?}");

        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok_123"));
    }

    #[test]
    fn accessors_return_presented_values() {
        let credentials = Credentials::password("alice", "hunter2")
            .with_value("access_token", "tok_123")
            .with_segments(["h", "p", "s"]);

        assert_eq!(credentials.identifier(), Some("alice"));
        assert_eq!(credentials.presented_password(), Some("hunter2"));
        assert_eq!(credentials.value("access_token"), Some("tok_123"));
        assert_eq!(credentials.segments(), vec!["h", "p", "s"]);
    }
}
