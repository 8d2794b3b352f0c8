//! In-memory credential store using a Tokio mutex.
//!
//! Suitable for single-node development and tests. Every operation holds
//! the lock for its whole duration, so multi-step operations are atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use sso_core::error::AppError;
use sso_core::result::AppResult;
use sso_entity::password_reset::PasswordResetToken;
use sso_entity::user::{DEFAULT_ROLE_NAME, NewUser, Role, User};

use crate::repositories::password_reset::generate_reset_token;

use super::CredentialStore;

#[derive(Debug)]
struct InnerState {
    roles: HashMap<i64, String>,
    users: BTreeMap<i64, User>,
    grants: BTreeMap<i64, PasswordResetToken>,
    next_user_id: i64,
    next_grant_id: i64,
}

impl InnerState {
    fn role_name(&self, role_id: i64) -> String {
        self.roles
            .get(&role_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_ROLE_NAME.to_string())
    }

    fn insert_user(&mut self, user: &NewUser) -> AppResult<i64> {
        let taken = self
            .users
            .values()
            .any(|u| !u.is_deleted && u.login == user.login);
        if taken {
            return Err(AppError::user_already_exists());
        }

        let id = self.next_user_id;
        self.next_user_id += 1;

        let record = User {
            id,
            role_id: user.role_id,
            role_name: self.role_name(user.role_id),
            login: user.login.clone(),
            telegram_username: Some(user.telegram_username.clone()),
            telegram_chat_id: user.telegram_chat_id,
            telegram_verified: false,
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
            updated_at: None,
            last_login_at: None,
            is_archived: false,
            is_deleted: false,
        };
        self.users.insert(id, record);
        Ok(id)
    }

    fn visible_user(&self, id: i64) -> Option<User> {
        self.users.get(&id).filter(|u| !u.is_deleted).cloned()
    }

    fn set_password(&mut self, user_id: i64, password_hash: &str) {
        if let Some(user) = self.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Some(Utc::now());
        }
    }
}

/// Process-local credential store.
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store with the seeded roles.
    pub fn new() -> Self {
        let roles = Role::seeded().into_iter().map(|r| (r.id, r.name)).collect();
        Self {
            state: Arc::new(Mutex::new(InnerState {
                roles,
                users: BTreeMap::new(),
                grants: BTreeMap::new(),
                next_user_id: 1,
                next_grant_id: 1,
            })),
        }
    }

    /// Archive or unarchive a user. Returns `false` if the user is unknown.
    pub async fn set_archived(&self, user_id: i64, archived: bool) -> bool {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.is_archived = archived;
                user.updated_at = Some(Utc::now());
                info!(user_id, archived, "User archive status changed");
                true
            }
            None => false,
        }
    }

    /// Soft-delete a user. Returns `false` if the user is unknown.
    pub async fn soft_delete(&self, user_id: i64) -> bool {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.is_deleted = true;
                user.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Number of stored users, including archived and deleted ones.
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        let active = || state.users.values().filter(|u| u.is_active());

        let found = active()
            .find(|u| u.login == login)
            .or_else(|| active().find(|u| u.answers_to(login)))
            .cloned();
        Ok(found)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.visible_user(id))
    }

    async fn create(&self, user: &NewUser) -> AppResult<i64> {
        self.state.lock().await.insert_user(user)
    }

    async fn create_and_load(&self, user: &NewUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let id = state.insert_user(user)?;
        state
            .visible_user(id)
            .ok_or_else(|| AppError::store(format!("Created user {id} could not be read back")))
    }

    async fn create_reset_grant(&self, user_id: i64, ttl_minutes: i64) -> AppResult<String> {
        let mut state = self.state.lock().await;
        let id = state.next_grant_id;
        state.next_grant_id += 1;

        let now = Utc::now();
        let token = generate_reset_token();
        state.grants.insert(
            id,
            PasswordResetToken {
                id,
                user_id,
                token: token.clone(),
                expires_at: now + Duration::minutes(ttl_minutes),
                consumed_at: None,
                is_revoked: false,
                created_at: now,
            },
        );

        debug!(user_id, ttl_minutes, "Password reset grant created");
        Ok(token)
    }

    async fn find_reset_grant(&self, token: &str) -> AppResult<Option<PasswordResetToken>> {
        let state = self.state.lock().await;
        Ok(state.grants.values().find(|g| g.token == token).cloned())
    }

    async fn consume_reset_grant(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(grant) = state.grants.get_mut(&id) {
            grant.consume(Utc::now());
        }
        Ok(())
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        self.state.lock().await.set_password(user_id, password_hash);
        Ok(())
    }

    async fn redeem_reset_grant(
        &self,
        grant_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        match state.grants.get_mut(&grant_id) {
            Some(grant) if grant.user_id == user_id && grant.is_usable_at(now) => {
                grant.consume(now);
            }
            _ => return Ok(false),
        }

        state.set_password(user_id, password_hash);
        Ok(true)
    }

    async fn purge_expired_reset_grants(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let before = state.grants.len();
        state.grants.retain(|_, g| g.expires_at > now);
        Ok((before - state.grants.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sso_core::error::ErrorKind;
    use sso_entity::user::DEFAULT_ROLE_ID;

    fn new_user(login: &str, telegram: Option<&str>) -> NewUser {
        NewUser::new(login, telegram, None, "Test User", "hash".to_string(), None)
    }

    #[tokio::test]
    async fn test_create_and_load_resolves_role() {
        let store = MemoryCredentialStore::new();
        let user = store.create_and_load(&new_user("alice", None)).await.unwrap();
        assert_eq!(user.role_id, DEFAULT_ROLE_ID);
        assert_eq!(user.role_name, DEFAULT_ROLE_NAME);
        assert_eq!(user.telegram_username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let store = MemoryCredentialStore::new();
        store.create(&new_user("alice", None)).await.unwrap();
        let err = store.create(&new_user("alice", Some("other"))).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UserAlreadyExists);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_login_or_handle() {
        let store = MemoryCredentialStore::new();
        let id = store.create(&new_user("alice", Some("@alice_tg"))).await.unwrap();

        for probe in ["alice", "alice_tg", "@alice_tg"] {
            let found = store.find_by_login(probe).await.unwrap();
            assert_eq!(found.map(|u| u.id), Some(id), "probe {probe}");
        }
        assert!(store.find_by_login("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_match_preferred_over_handle() {
        let store = MemoryCredentialStore::new();
        let first = store.create(&new_user("carol", Some("dave"))).await.unwrap();
        let second = store.create(&new_user("dave", None)).await.unwrap();
        assert_ne!(first, second);

        let found = store.find_by_login("dave").await.unwrap().unwrap();
        assert_eq!(found.id, second);
    }

    #[tokio::test]
    async fn test_archived_hidden_from_login_but_not_id() {
        let store = MemoryCredentialStore::new();
        let id = store.create(&new_user("erin", None)).await.unwrap();
        assert!(store.set_archived(id, true).await);

        assert!(store.find_by_login("erin").await.unwrap().is_none());
        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        assert!(by_id.is_archived);
    }

    #[tokio::test]
    async fn test_deleted_user_invisible_and_login_reusable() {
        let store = MemoryCredentialStore::new();
        let id = store.create(&new_user("frank", None)).await.unwrap();
        assert!(store.soft_delete(id).await);

        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.find_by_login("frank").await.unwrap().is_none());
        assert!(store.create(&new_user("frank", None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_redeem_is_single_use() {
        let store = MemoryCredentialStore::new();
        let user_id = store.create(&new_user("gina", None)).await.unwrap();
        let token = store.create_reset_grant(user_id, 30).await.unwrap();
        let grant = store.find_reset_grant(&token).await.unwrap().unwrap();

        assert!(store.redeem_reset_grant(grant.id, user_id, "new-hash").await.unwrap());
        assert!(!store.redeem_reset_grant(grant.id, user_id, "other-hash").await.unwrap());

        let user = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(user.updated_at.is_some());

        let grant = store.find_reset_grant(&token).await.unwrap().unwrap();
        assert!(grant.is_revoked);
        assert!(grant.consumed_at.is_some());
    }

    #[tokio::test]
    async fn test_redeem_rejects_foreign_or_expired_grant() {
        let store = MemoryCredentialStore::new();
        let owner = store.create(&new_user("hank", None)).await.unwrap();
        let other = store.create(&new_user("ivan", None)).await.unwrap();

        let token = store.create_reset_grant(owner, 30).await.unwrap();
        let grant = store.find_reset_grant(&token).await.unwrap().unwrap();
        assert!(!store.redeem_reset_grant(grant.id, other, "x").await.unwrap());

        let expired = store.create_reset_grant(owner, 0).await.unwrap();
        let expired = store.find_reset_grant(&expired).await.unwrap().unwrap();
        assert!(!store.redeem_reset_grant(expired.id, owner, "x").await.unwrap());

        let user = store.find_by_id(owner).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryCredentialStore::new();
        let user_id = store.create(&new_user("jade", None)).await.unwrap();
        let live = store.create_reset_grant(user_id, 30).await.unwrap();
        store.create_reset_grant(user_id, -1).await.unwrap();

        assert_eq!(store.purge_expired_reset_grants().await.unwrap(), 1);
        assert!(store.find_reset_grant(&live).await.unwrap().is_some());
    }
}
