//! Authentication pipeline for Warden.
//!
//! A [`Firewall`] owns an [`AuthenticatorManager`] holding an ordered list of
//! [`Authenticator`]s and an [`EventDispatcher`] of listeners. For each
//! request the manager selects the authenticators that apply, runs the first
//! one that can authenticate, and reports the outcome through events:
//!
//! - credential verification, account checks and password migration are
//!   listeners on the verification event
//! - session fixation protection, remember-me cookies and audit logging are
//!   listeners on the success, failure and logout notifications

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod events;
pub mod firewall;
pub mod listeners;
pub mod manager;
pub mod password;
pub mod provider;
pub mod refresh;
pub mod remember_me;
pub mod request;
pub mod session;
pub mod storage;
pub mod user_provider;
pub mod verifier;

pub use authenticator::{Authenticator, CredentialCheck, Support};
pub use credentials::Credentials;
pub use error::{AuthenticationError, SecurityError, SecurityResult};
pub use events::{AuthListener, EventDispatcher};
pub use firewall::{Firewall, FirewallBuilder};
pub use manager::{AuthenticatorManager, TokenOutcome};
pub use provider::{PreAuthenticatedProvider, PreAuthenticationToken, ProviderToken};
pub use refresh::TokenRefresher;
pub use request::{Request, Response};
pub use session::Session;
pub use storage::{MemoryTokenStorage, TokenStorage};
pub use user_provider::{InMemoryUserProvider, PasswordUpgrader, UserProvider};
