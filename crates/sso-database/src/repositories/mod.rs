//! PostgreSQL repositories for users and reset grants.

pub mod password_reset;
pub mod user;

pub use password_reset::PasswordResetRepository;
pub use user::UserRepository;

use sso_core::error::{AppError, ErrorKind};

/// Wraps a sqlx error into a store failure.
pub(crate) fn store_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Store, format!("{context}: {err}"), err)
}
