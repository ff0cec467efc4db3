//! # warden-entity
//!
//! Domain models shared by the authentication pipeline and its hosts:
//! the [`User`](user::User) resolved during authentication and the
//! [`Token`](token::Token) installed once authentication succeeds.

pub mod token;
pub mod user;
