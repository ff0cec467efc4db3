//! Warden server: authentication pipeline behind an HTTP host.
//!
//! Main entry point that loads configuration, sets up logging and runs
//! the selected command.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use warden_auth::password::{Argon2PasswordHasher, PasswordMatcher};
use warden_core::config::{AppConfig, LogFormat};
use warden_core::error::AppError;

/// Warden authentication server.
#[derive(Debug, Parser)]
#[command(name = "warden-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print an Argon2id hash for a password, for use in `firewall.users`.
    HashPassword {
        /// The plaintext password.
        password: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run(config).await,
        Command::HashPassword { password } => hash_password(&password),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Warden exited with an error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        firewall = %config.firewall.name,
        "Starting Warden"
    );
    warden_api::run_server(config).await
}

fn hash_password(password: &str) -> Result<(), AppError> {
    let hash = Argon2PasswordHasher::new().hash(password)?;
    println!("{hash}");
    Ok(())
}
