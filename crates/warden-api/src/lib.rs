//! # warden-api
//!
//! HTTP host for the Warden authentication pipeline, built on Axum.
//!
//! Every request passes through the firewall middleware, which runs the
//! configured authenticators, persists tokens in the server-side session
//! store for stateful firewalls, and applies pending remember-me cookies.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod session;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
