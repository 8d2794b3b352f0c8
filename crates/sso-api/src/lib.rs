//! # sso-api
//!
//! HTTP API layer for the SSO service built on Axum.
//!
//! Maps the auth engine's operations onto `/auth/*` routes, carries the
//! refresh token in an HTTP-only cookie, and converts `AppError` into JSON
//! error responses.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
