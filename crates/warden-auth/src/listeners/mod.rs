//! Listeners shipped with the pipeline.

pub mod audit;
pub mod password_migration;
pub mod remember_me;
pub mod session_strategy;

pub use audit::LoginAuditListener;
pub use password_migration::PasswordMigrationListener;
pub use remember_me::RememberMeListener;
pub use session_strategy::SessionStrategyListener;
