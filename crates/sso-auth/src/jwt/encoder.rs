//! JWT token creation with HS256 signing and configured lifetimes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use sso_core::config::{AuthConfig, MAX_ACCESS_TTL_MINUTES};
use sso_core::error::AppError;

use super::claims::{Claims, TokenPurpose};

/// Refresh tokens live for a fixed 30 days.
pub const REFRESH_TTL_DAYS: i64 = 30;

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL.
    access_ttl: Duration,
    /// Refresh token TTL.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let access_minutes = config.access_ttl_minutes.min(MAX_ACCESS_TTL_MINUTES);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(access_minutes as i64),
            refresh_ttl: Duration::days(REFRESH_TTL_DAYS),
        }
    }

    /// Issues a matched access + refresh pair for the given user.
    pub fn issue(&self, user_id: i64, role: &str) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access_expires_at = now + self.access_ttl;
        let refresh_expires_at = now + self.refresh_ttl;

        let access_token = self.sign(user_id, role, TokenPurpose::Access, access_expires_at)?;
        let refresh_token = self.sign(user_id, role, TokenPurpose::Refresh, refresh_expires_at)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    fn sign(
        &self,
        user_id: i64,
        role: &str,
        typ: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            typ,
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {typ} token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl: u64) -> AuthConfig {
        AuthConfig {
            jwt_secret: "encoder-test-secret".to_string(),
            access_ttl_minutes: ttl,
            password_min_length: 8,
        }
    }

    #[test]
    fn test_access_expiry_follows_config() {
        let pair = JwtEncoder::new(&config(15)).issue(3, "customer").unwrap();
        let lifetime = pair.access_expires_at - Utc::now();
        assert!(lifetime <= Duration::minutes(15));
        assert!(lifetime > Duration::minutes(14));
    }

    #[test]
    fn test_oversized_access_ttl_is_capped() {
        let pair = JwtEncoder::new(&config(u64::MAX)).issue(3, "customer").unwrap();
        assert!(pair.access_expires_at > Utc::now());
        assert!(pair.access_expires_at <= pair.refresh_expires_at);
    }
}
