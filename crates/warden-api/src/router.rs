//! Route definitions for the Warden HTTP host.
//!
//! The firewall middleware wraps every route, so handlers only ever see
//! requests the pipeline let through.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let mut routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/whoami", get(handlers::auth::whoami))
        .route("/api/logout", post(handlers::auth::logout));

    if let Some(form) = &state.config.firewall.form_login {
        routes = routes
            .route(&form.login_path, get(handlers::auth::login_form))
            .route(&form.check_path, post(handlers::auth::login_check));
    }

    routes
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::firewall::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
