//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sso_auth::AuthRequest;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login or telegram handle.
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,
    /// Password.
    pub password: String,
}

impl From<LoginRequest> for AuthRequest {
    fn from(req: LoginRequest) -> Self {
        AuthRequest {
            login: req.login,
            password: req.password,
            ..Default::default()
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired login.
    #[validate(length(min = 1, max = 255, message = "Login is required"))]
    pub login: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Display name.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub full_name: String,
    /// Telegram handle, with or without the leading `@`.
    #[serde(default)]
    pub telegram_username: Option<String>,
    /// Telegram chat id.
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
}

impl From<RegisterRequest> for AuthRequest {
    fn from(req: RegisterRequest) -> Self {
        AuthRequest {
            login: req.login,
            password: req.password,
            full_name: req.full_name,
            telegram_username: req.telegram_username,
            telegram_chat_id: req.telegram_chat_id,
            role_id: None,
        }
    }
}

/// Password reset request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    /// Login or telegram handle.
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,
}

/// Password reset completion body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetComplete {
    /// Token from the reset request.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}
