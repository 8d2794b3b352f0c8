//! Self-service password reset.

use chrono::Utc;
use tracing::{debug, info};

use sso_core::error::AppError;
use sso_entity::password_reset::RESET_TOKEN_TTL_MINUTES;

use super::manager::AuthManager;

impl AuthManager {
    /// Mints a reset grant for the user named by `login`.
    ///
    /// An unknown login yields an empty token rather than an error, so the
    /// caller cannot tell whether the account exists.
    pub async fn request_reset(&self, login: &str) -> Result<String, AppError> {
        const OP: &str = "Auth.RequestPasswordReset";

        let Some(user) = self
            .store
            .find_by_login(login)
            .await
            .map_err(|e| e.in_operation(OP))?
        else {
            debug!(op = OP, "Reset requested for unknown login");
            return Ok(String::new());
        };

        let token = self
            .store
            .create_reset_grant(user.id, RESET_TOKEN_TTL_MINUTES)
            .await
            .map_err(|e| e.in_operation(OP))?;

        info!(op = OP, user_id = user.id, "Password reset granted");
        Ok(token)
    }

    /// Sets a new password using a reset grant.
    ///
    /// Unknown, revoked, consumed and expired grants all fail with
    /// `InvalidResetToken`. The password write and the grant consumption
    /// happen in one store operation; a grant redeemed concurrently leaves
    /// the password untouched.
    pub async fn complete_reset(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        const OP: &str = "Auth.CompletePasswordReset";

        if token.is_empty() {
            return Err(AppError::invalid_reset_token());
        }
        self.password_validator.validate(new_password)?;

        let grant = self
            .store
            .find_reset_grant(token)
            .await
            .map_err(|e| e.in_operation(OP))?
            .filter(|g| g.is_usable_at(Utc::now()))
            .ok_or_else(AppError::invalid_reset_token)?;

        let password_hash = self
            .password_hasher
            .hash_password(new_password)
            .map_err(|e| e.in_operation(OP))?;

        let redeemed = self
            .store
            .redeem_reset_grant(grant.id, grant.user_id, &password_hash)
            .await
            .map_err(|e| e.in_operation(OP))?;

        if !redeemed {
            return Err(AppError::invalid_reset_token());
        }

        info!(op = OP, user_id = grant.user_id, "Password reset completed");
        Ok(())
    }
}
