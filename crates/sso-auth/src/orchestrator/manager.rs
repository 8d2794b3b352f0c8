//! Credential verification, registration and refresh flows.

use std::sync::Arc;

use tracing::{info, warn};

use sso_core::config::AuthConfig;
use sso_core::error::AppError;
use sso_database::CredentialStore;
use sso_entity::user::{NewUser, User};

use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::{PasswordHasher, PasswordValidator};

use super::{AuthRequest, AuthResponse};

/// The authentication engine.
///
/// Holds no mutable state: every operation is a single pass over the
/// credential store and the token codec, so one instance is shared by all
/// request handlers.
#[derive(Clone)]
pub struct AuthManager {
    /// Users and reset grants.
    pub(super) store: Arc<dyn CredentialStore>,
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher.
    pub(super) password_hasher: Arc<PasswordHasher>,
    /// Policy applied to newly chosen passwords.
    pub(super) password_validator: PasswordValidator,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("jwt_encoder", &self.jwt_encoder)
            .field("password_validator", &self.password_validator)
            .finish()
    }
}

impl AuthManager {
    /// Creates a new auth manager with all required dependencies.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        password_hasher: Arc<PasswordHasher>,
        password_validator: PasswordValidator,
    ) -> Self {
        Self {
            store,
            jwt_encoder,
            jwt_decoder,
            password_hasher,
            password_validator,
        }
    }

    /// Builds the codec, hasher and policy from configuration.
    pub fn from_config(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            Arc::new(JwtEncoder::new(config)),
            Arc::new(JwtDecoder::new(config)),
            Arc::new(PasswordHasher::new()),
            PasswordValidator::new(config),
        )
    }

    /// The decoder used for refresh tokens, shared with the transport for
    /// access-token checks.
    pub fn jwt_decoder(&self) -> &Arc<JwtDecoder> {
        &self.jwt_decoder
    }

    /// Logs a user in, or registers a new one when `is_registration` is set.
    ///
    /// 1. Reject an empty login, and an empty password on registration
    /// 2. Look the user up by login or telegram handle
    /// 3. Registration: fail if found, otherwise create and load the user
    /// 4. Login: fail with the same error for unknown user and wrong password
    /// 5. Issue a token pair
    pub async fn authenticate_or_register(
        &self,
        request: &AuthRequest,
        is_registration: bool,
    ) -> Result<AuthResponse, AppError> {
        let op = if is_registration {
            "Auth.Register"
        } else {
            "Auth.Login"
        };

        if request.login.trim().is_empty() {
            return Err(AppError::validation("Login is required"));
        }
        if is_registration {
            if request.password.is_empty() {
                return Err(AppError::validation("Password is required"));
            }
            self.password_validator.validate(&request.password)?;
        }

        let existing = self
            .store
            .find_by_login(&request.login)
            .await
            .map_err(|e| e.in_operation(op))?;

        let user = if is_registration {
            self.register(request, existing, op).await?
        } else {
            self.verify_credentials(request, existing)?
        };

        let response = self.issue_for(&user, op)?;
        info!(op, user_id = user.id, role = %response.role, "Tokens issued");
        Ok(response)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// Token failures surface unchanged. The user is re-read so an archived
    /// or deleted account cannot refresh with a still-valid token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AppError> {
        const OP: &str = "Auth.Refresh";

        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;

        let user = self
            .store
            .find_by_id(claims.user_id())
            .await
            .map_err(|e| e.in_operation(OP))?
            .filter(|u| !u.is_archived)
            .ok_or_else(|| {
                warn!(op = OP, user_id = claims.user_id(), "Refresh for unknown or archived user");
                AppError::user_not_found()
            })?;

        self.issue_for(&user, OP)
    }

    async fn register(
        &self,
        request: &AuthRequest,
        existing: Option<User>,
        op: &str,
    ) -> Result<User, AppError> {
        if existing.is_some() {
            return Err(AppError::user_already_exists());
        }

        let password_hash = self
            .password_hasher
            .hash_password(&request.password)
            .map_err(|e| e.in_operation(op))?;

        let new_user = NewUser::new(
            &request.login,
            request.telegram_username.as_deref(),
            request.telegram_chat_id,
            &request.full_name,
            password_hash,
            request.role_id,
        );

        let user = self
            .store
            .create_and_load(&new_user)
            .await
            .map_err(|e| if e.kind.is_client_error() { e } else { e.in_operation(op) })?;

        info!(op, user_id = user.id, "User registered");
        Ok(user)
    }

    fn verify_credentials(
        &self,
        request: &AuthRequest,
        existing: Option<User>,
    ) -> Result<User, AppError> {
        let Some(user) = existing else {
            self.password_hasher.verify_dummy(&request.password);
            return Err(AppError::invalid_credentials());
        };

        let valid = self
            .password_hasher
            .verify_password(&request.password, &user.password_hash)
            .map_err(|e| e.in_operation("Auth.Login"))?;

        if !valid {
            return Err(AppError::invalid_credentials());
        }
        Ok(user)
    }

    fn issue_for(&self, user: &User, op: &str) -> Result<AuthResponse, AppError> {
        let role = user.role().to_string();
        let tokens = self
            .jwt_encoder
            .issue(user.id, &role)
            .map_err(|e| e.in_operation(op))?;

        Ok(AuthResponse {
            tokens,
            user_id: user.id,
            role,
        })
    }
}
