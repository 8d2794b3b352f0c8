//! Authentication orchestration: login, registration, token refresh and
//! self-service password reset.

pub mod manager;
pub mod reset;

pub use manager::AuthManager;

use serde::{Deserialize, Serialize};

use crate::jwt::TokenPair;

/// Input to [`AuthManager::authenticate_or_register`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Login, or telegram handle when logging in.
    pub login: String,
    /// Plaintext password.
    pub password: String,
    /// Display name, used on registration only.
    #[serde(default)]
    pub full_name: String,
    /// Telegram handle, used on registration only. Defaults to the login.
    #[serde(default)]
    pub telegram_username: Option<String>,
    /// Telegram chat id, used on registration only.
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    /// Role for the new user. Defaults to the customer role.
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// A freshly issued token pair together with who it was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Issued tokens.
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user_id: i64,
    /// Role embedded in the tokens.
    pub role: String,
}
