//! Application builder: wires firewall, state and router, and runs the server.

use axum::Router;
use tracing::{error, info};

use warden_auth::firewall::Firewall;
use warden_core::config::AppConfig;
use warden_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Assemble the firewall described by `config`.
pub fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    let firewall = Firewall::builder(config.firewall.clone()).build()?;
    Ok(AppState::new(config, firewall))
}

/// Build the Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Run the Warden server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Warden server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Warden server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
