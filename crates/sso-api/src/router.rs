//! Route definitions for the SSO HTTP API.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `AppState` through them.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/health", get(handlers::health::health))
        .with_state(state)
}

/// Auth endpoints: login, register, refresh, logout, password reset, validate
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/password/request",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/password/complete",
            post(handlers::auth::complete_password_reset),
        )
        .route("/validate", get(handlers::auth::validate))
}
