//! The credential store contract consumed by the auth engine.

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;

use sso_core::error::AppError;
use sso_core::result::AppResult;
use sso_entity::password_reset::PasswordResetToken;
use sso_entity::user::{NewUser, User};

/// Durable storage of users and password reset grants.
///
/// Implementations enforce login uniqueness among non-deleted users and
/// must make [`CredentialStore::redeem_reset_grant`] atomic. Lookups return
/// `Ok(None)` for missing rows; `Err` is reserved for store failures.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find an active (non-archived, non-deleted) user whose login equals
    /// `login` or whose telegram handle equals `login` without its leading `@`.
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Find a non-deleted user by id. Archived users are returned.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Persist a new user and return its id.
    ///
    /// Fails with `UserAlreadyExists` when the login is taken.
    async fn create(&self, user: &NewUser) -> AppResult<i64>;

    /// Persist a new user and return it with derived attributes resolved.
    ///
    /// The default runs [`Self::create`] followed by [`Self::find_by_id`];
    /// stores that can should override it with a single transaction.
    async fn create_and_load(&self, user: &NewUser) -> AppResult<User> {
        let id = self.create(user).await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::store(format!("Created user {id} could not be read back")))
    }

    /// Mint a reset grant for `user_id` and return its opaque token.
    async fn create_reset_grant(&self, user_id: i64, ttl_minutes: i64) -> AppResult<String>;

    /// Look up a reset grant by token value, whatever its state.
    async fn find_reset_grant(&self, token: &str) -> AppResult<Option<PasswordResetToken>>;

    /// Mark a grant consumed and revoked.
    async fn consume_reset_grant(&self, id: i64) -> AppResult<()>;

    /// Replace a user's password hash and bump its update timestamp.
    async fn update_password(&self, user_id: i64, password_hash: &str) -> AppResult<()>;

    /// Atomically consume a still-usable grant owned by `user_id` and store
    /// the new password hash.
    ///
    /// Returns `false` and writes nothing when the grant is no longer usable.
    async fn redeem_reset_grant(
        &self,
        grant_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> AppResult<bool>;

    /// Remove expired grants. Returns how many were removed.
    async fn purge_expired_reset_grants(&self) -> AppResult<u64>;
}
