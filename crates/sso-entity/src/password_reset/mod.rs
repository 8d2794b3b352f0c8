//! Password reset grants.

pub mod model;

pub use model::{PasswordResetToken, RESET_TOKEN_TTL_MINUTES};
