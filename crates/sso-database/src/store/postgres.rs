//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use sqlx::PgPool;

use sso_core::result::AppResult;
use sso_entity::password_reset::PasswordResetToken;
use sso_entity::user::{NewUser, User};

use crate::repositories::{PasswordResetRepository, UserRepository};

use super::CredentialStore;

/// Credential store over the `users`, `roles` and `password_reset_tokens` tables.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    users: UserRepository,
    resets: PasswordResetRepository,
}

impl PgCredentialStore {
    /// Creates a store sharing the given pool between both repositories.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            resets: PasswordResetRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.users.find_by_login(login).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn create(&self, user: &NewUser) -> AppResult<i64> {
        self.users.create(user).await
    }

    async fn create_and_load(&self, user: &NewUser) -> AppResult<User> {
        self.users.create_and_load(user).await
    }

    async fn create_reset_grant(&self, user_id: i64, ttl_minutes: i64) -> AppResult<String> {
        self.resets.create(user_id, ttl_minutes).await
    }

    async fn find_reset_grant(&self, token: &str) -> AppResult<Option<PasswordResetToken>> {
        self.resets.find_by_token(token).await
    }

    async fn consume_reset_grant(&self, id: i64) -> AppResult<()> {
        self.resets.consume(id).await
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        self.users.update_password(user_id, password_hash).await
    }

    async fn redeem_reset_grant(
        &self,
        grant_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> AppResult<bool> {
        self.resets.redeem(grant_id, user_id, password_hash).await
    }

    async fn purge_expired_reset_grants(&self) -> AppResult<u64> {
        self.resets.purge_expired().await
    }
}
