//! Security tokens.

pub mod model;

pub use model::{Token, TokenKind};
