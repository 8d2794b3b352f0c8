//! Password reset grant repository.

use chrono::{Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use tracing::{debug, info};

use sso_core::result::AppResult;
use sso_entity::password_reset::PasswordResetToken;

use super::store_error;
use super::user::set_password;

/// Length of the opaque token handed to the user.
const RESET_TOKEN_LENGTH: usize = 48;

/// Generate an opaque, URL-safe reset token from the thread-local CSPRNG.
pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Repository for password reset grants.
#[derive(Debug, Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    /// Create a new password reset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a grant for `user_id` valid for `ttl_minutes` and return its token.
    pub async fn create(&self, user_id: i64, ttl_minutes: i64) -> AppResult<String> {
        let token = generate_reset_token();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token, expires_at, is_revoked, created_at) \
             VALUES ($1, $2, $3, FALSE, $4)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now + Duration::minutes(ttl_minutes))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to request password reset", e))?;

        debug!(user_id, ttl_minutes, "Password reset grant created");
        Ok(token)
    }

    /// Find a grant by its token value.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordResetToken>> {
        sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token, expires_at, consumed_at, is_revoked, created_at \
             FROM password_reset_tokens \
             WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to get password reset token", e))
    }

    /// Mark a grant consumed and revoked.
    pub async fn consume(&self, id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE password_reset_tokens \
             SET consumed_at = now(), is_revoked = TRUE \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to mark reset token consumed", e))?;
        Ok(())
    }

    /// Consume a still-usable grant and set the owner's new password in one
    /// transaction.
    ///
    /// Returns `false`, with nothing written, when the grant was revoked,
    /// consumed or expired by the time the transaction ran.
    pub async fn redeem(&self, grant_id: i64, user_id: i64, password_hash: &str) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", e))?;

        let consumed = sqlx::query(
            "UPDATE password_reset_tokens \
             SET consumed_at = now(), is_revoked = TRUE \
             WHERE id = $1 AND user_id = $2 \
               AND is_revoked = FALSE AND consumed_at IS NULL AND expires_at > now()",
        )
        .bind(grant_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("Failed to consume reset token", e))?
        .rows_affected();

        if consumed == 0 {
            tx.rollback()
                .await
                .map_err(|e| store_error("Failed to roll back reset redemption", e))?;
            return Ok(false);
        }

        set_password(&mut *tx, user_id, password_hash).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit reset redemption", e))?;

        Ok(true)
    }

    /// Delete grants whose expiry has passed. Returns the number removed.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let removed = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to purge expired reset tokens", e))?
            .rows_affected();

        if removed > 0 {
            info!(removed, "Purged expired password reset grants");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_distinct_and_alphanumeric() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), RESET_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
