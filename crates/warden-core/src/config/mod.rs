//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod firewall;
pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};

pub use self::firewall::{
    AccessTokenConfig, FirewallConfig, FormLoginConfig, HttpBasicConfig, RememberMeConfig,
    SessionFixationStrategy, UserConfig,
};
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::server::ServerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Firewall and authenticator settings.
    #[serde(default)]
    pub firewall: FirewallConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Values from the file are overridden by environment variables prefixed
    /// with `WARDEN__`, e.g. `WARDEN__SERVER__PORT=9000`. A missing file is
    /// not an error; every field has a default.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.firewall.validate()?;
        Ok(app)
    }
}
