//! User domain entities.

pub mod model;
pub mod status;

pub use model::{ANONYMOUS_IDENTIFIER, User};
pub use status::UserStatus;
