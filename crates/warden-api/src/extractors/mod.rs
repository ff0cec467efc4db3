//! Request extractors for values placed by the firewall middleware.

pub mod auth;

pub use auth::{AuthToken, CurrentSession};
