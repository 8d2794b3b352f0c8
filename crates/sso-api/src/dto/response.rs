//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sso_auth::{AuthResponse, Claims};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Token pair returned by login, registration and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub user_id: i64,
    pub role: String,
}

impl From<AuthResponse> for AuthTokenResponse {
    fn from(res: AuthResponse) -> Self {
        Self {
            access_token: res.tokens.access_token,
            refresh_token: res.tokens.refresh_token,
            access_expires_at: res.tokens.access_expires_at,
            refresh_expires_at: res.tokens.refresh_expires_at,
            user_id: res.user_id,
            role: res.role,
        }
    }
}

/// Result of a reset request. Empty for unknown logins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenResponse {
    pub token: String,
}

/// Claims of a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    pub user_id: i64,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for TokenInfoResponse {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            expires_at: claims.expires_at(),
            role: claims.role,
        }
    }
}

/// Generic message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}
