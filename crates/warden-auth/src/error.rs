//! Error types for the authentication pipeline.
//!
//! [`AuthenticationError`] is the recoverable family: the manager catches it
//! and routes it to the failure hooks. Everything else in [`SecurityError`]
//! is a programming or configuration fault and propagates to the host.

use chrono::{DateTime, Utc};
use warden_core::error::{AppError, ErrorKind};

/// A failed authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    /// The presented credentials do not match.
    #[error("Invalid credentials.")]
    BadCredentials,

    /// A password was required but none (or an empty one) was presented.
    #[error("The presented password cannot be empty.")]
    EmptyCredentials,

    /// No user matches the presented identity.
    #[error("User \"{identifier}\" not found.")]
    UserNotFound {
        /// The identifier that failed to resolve.
        identifier: String,
    },

    /// The account is disabled.
    #[error("Account is disabled.")]
    AccountDisabled,

    /// The account is locked.
    #[error("Account is locked.")]
    AccountLocked {
        /// End of the lock window, when known.
        until: Option<DateTime<Utc>>,
    },

    /// The account has expired.
    #[error("Account has expired.")]
    AccountExpired,

    /// The stored credentials have expired.
    #[error("Credentials have expired.")]
    CredentialsExpired,

    /// A pre-authenticated token names an authenticator this firewall does not have.
    #[error("No authenticator registered under key \"{key}\".")]
    AuthenticatorNotFound {
        /// The missing authenticator key.
        key: String,
    },

    /// The token is no longer authenticated; treated like a logout.
    #[error("Authentication expired because the account information has changed.")]
    AuthenticationExpired,

    /// An authenticator-specific failure with a client-safe message.
    #[error("{0}")]
    Custom(String),
}

impl AuthenticationError {
    /// Message that is safe to show to the client.
    pub fn message_key(&self) -> &str {
        match self {
            Self::BadCredentials | Self::UserNotFound { .. } => "Invalid credentials.",
            Self::EmptyCredentials => "The presented password cannot be empty.",
            Self::AccountDisabled => "Account is disabled.",
            Self::AccountLocked { .. } => "Account is locked.",
            Self::AccountExpired => "Account has expired.",
            Self::CredentialsExpired => "Credentials have expired.",
            Self::AuthenticatorNotFound { .. } => "No authentication provider found.",
            Self::AuthenticationExpired => "Authentication expired.",
            Self::Custom(message) => message,
        }
    }

    /// Whether this error reports the state of the account rather than the credentials.
    pub fn is_account_status(&self) -> bool {
        matches!(
            self,
            Self::AccountDisabled
                | Self::AccountLocked { .. }
                | Self::AccountExpired
                | Self::CredentialsExpired
        )
    }
}

/// Every error the security pipeline can raise.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// A recoverable authentication failure.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// A component was called in a way its contract forbids.
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// An authenticator or the firewall is wired incorrectly.
    #[error("Authenticator \"{key}\" is misconfigured: {reason}")]
    Misconfigured {
        /// Key of the offending authenticator or firewall.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A failure from an infrastructure collaborator.
    #[error(transparent)]
    App(#[from] AppError),
}

impl SecurityError {
    /// Build an invalid-usage error.
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage(message.into())
    }

    /// Build a misconfiguration error.
    pub fn misconfigured(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Misconfigured {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The authentication failure, if this is one.
    pub fn as_authentication(&self) -> Option<&AuthenticationError> {
        match self {
            Self::Authentication(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SecurityError> for AppError {
    fn from(e: SecurityError) -> Self {
        match e {
            SecurityError::Authentication(err) => {
                AppError::with_source(ErrorKind::Authentication, err.message_key().to_string(), err)
            }
            SecurityError::InvalidUsage(message) => AppError::invalid_usage(message),
            SecurityError::Misconfigured { key, reason } => AppError::configuration(format!(
                "Authenticator \"{key}\" is misconfigured: {reason}"
            )),
            SecurityError::App(err) => err,
        }
    }
}

/// Result alias for the security pipeline.
pub type SecurityResult<T> = Result<T, SecurityError>;
