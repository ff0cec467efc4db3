//! Axum middleware stack.

pub mod firewall;

pub use firewall::LogoutRequested;
