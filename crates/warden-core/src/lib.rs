//! Core configuration and error handling for Warden.
//!
//! Every other crate in the workspace depends on this one for the shared
//! [`AppError`](error::AppError) boundary type and the configuration schemas.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
