//! Authentication events and the bus that delivers them.
//!
//! The manager raises events at fixed points of the pipeline; listeners
//! registered on the [`EventDispatcher`] react to them. The verification
//! event decides the outcome of an attempt, while the remaining events are
//! notifications that cannot change an outcome already reached.

pub mod dispatcher;
pub mod listener;

use warden_entity::token::Token;

use crate::authenticator::Authenticator;
use crate::error::AuthenticationError;
use crate::request::{Request, Response};

pub use dispatcher::EventDispatcher;
pub use listener::AuthListener;

/// A token was installed by an interactive login.
#[derive(Debug)]
pub struct InteractiveLoginEvent<'a> {
    /// The request that logged in.
    pub request: &'a mut Request,
    /// The installed token.
    pub token: &'a Token,
    /// Firewall name.
    pub firewall: &'a str,
}

/// Authentication succeeded and the authenticator's success hook ran.
#[derive(Debug)]
pub struct LoginSuccessEvent<'a> {
    /// The authenticator that succeeded.
    pub authenticator: &'a dyn Authenticator,
    /// The installed token.
    pub token: &'a Token,
    /// Firewall name.
    pub firewall: &'a str,
    /// The request.
    pub request: &'a mut Request,
    /// Response from the success hook; listeners may replace or decorate it.
    pub response: Option<Response>,
}

/// Authentication failed and the authenticator's failure hook ran.
#[derive(Debug)]
pub struct LoginFailureEvent<'a> {
    /// The authenticator that failed.
    pub authenticator: &'a dyn Authenticator,
    /// Why it failed.
    pub error: &'a AuthenticationError,
    /// Firewall name.
    pub firewall: &'a str,
    /// The request.
    pub request: &'a mut Request,
    /// Response from the failure hook; listeners may replace or decorate it.
    pub response: Option<Response>,
}

/// The token was removed from storage.
#[derive(Debug)]
pub struct LogoutEvent<'a> {
    /// The request.
    pub request: &'a mut Request,
    /// The token that was removed, if any.
    pub token: Option<&'a Token>,
    /// Firewall name.
    pub firewall: &'a str,
    /// Response listeners may attach cookie changes to.
    pub response: Option<Response>,
}
