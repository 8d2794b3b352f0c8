//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::{DEFAULT_ROLE_ID, DEFAULT_ROLE_NAME};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Role foreign key.
    pub role_id: i64,
    /// Role name resolved from the roles table on read.
    pub role_name: String,
    /// Login handle, unique among non-deleted users.
    pub login: String,
    /// Telegram username without the leading `@`.
    pub telegram_username: Option<String>,
    /// Telegram chat used by the bot to reach this user.
    pub telegram_chat_id: Option<i64>,
    /// Whether the telegram handle has been confirmed.
    pub telegram_verified: bool,
    /// Human-readable display name.
    pub full_name: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: Option<DateTime<Utc>>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Deactivated by an administrator.
    pub is_archived: bool,
    /// Soft-deleted.
    pub is_deleted: bool,
}

impl User {
    /// Whether this account may authenticate or refresh tokens.
    pub fn is_active(&self) -> bool {
        !self.is_archived && !self.is_deleted
    }

    /// Role name to embed in tokens, falling back to the default role.
    pub fn role(&self) -> &str {
        if self.role_name.is_empty() {
            DEFAULT_ROLE_NAME
        } else {
            &self.role_name
        }
    }

    /// Whether `login` designates this user, either by login handle or by
    /// telegram username (with an optional leading `@`).
    pub fn answers_to(&self, login: &str) -> bool {
        if self.login == login {
            return true;
        }
        let handle = telegram_lookup_key(login);
        self.telegram_username.as_deref() == Some(handle)
    }
}

/// Strips one leading `@` from a telegram handle. Matching is case-sensitive.
pub fn telegram_lookup_key(handle: &str) -> &str {
    handle.strip_prefix('@').unwrap_or(handle)
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired login.
    pub login: String,
    /// Telegram username, normalized.
    pub telegram_username: String,
    /// Telegram chat id, if known.
    pub telegram_chat_id: Option<i64>,
    /// Display name.
    pub full_name: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role_id: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Builds a registration record.
    ///
    /// A blank telegram username falls back to the login, and a missing role
    /// falls back to [`DEFAULT_ROLE_ID`].
    pub fn new(
        login: &str,
        telegram_username: Option<&str>,
        telegram_chat_id: Option<i64>,
        full_name: &str,
        password_hash: String,
        role_id: Option<i64>,
    ) -> Self {
        let telegram_username = match telegram_username.map(str::trim) {
            Some(handle) if !handle.is_empty() => telegram_lookup_key(handle).to_string(),
            _ => login.to_string(),
        };

        Self {
            login: login.to_string(),
            telegram_username,
            telegram_chat_id,
            full_name: full_name.to_string(),
            password_hash,
            role_id: role_id.unwrap_or(DEFAULT_ROLE_ID),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str, telegram: Option<&str>) -> User {
        User {
            id: 1,
            role_id: DEFAULT_ROLE_ID,
            role_name: "customer".to_string(),
            login: login.to_string(),
            telegram_username: telegram.map(String::from),
            telegram_chat_id: None,
            telegram_verified: false,
            full_name: String::new(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            last_login_at: None,
            is_archived: false,
            is_deleted: false,
        }
    }

    #[test]
    fn test_answers_to_login_and_handle() {
        let u = user("alice", Some("alice_tg"));
        assert!(u.answers_to("alice"));
        assert!(u.answers_to("alice_tg"));
        assert!(u.answers_to("@alice_tg"));
        assert!(!u.answers_to("Alice_tg"));
        assert!(!u.answers_to("@alice"));
    }

    #[test]
    fn test_new_user_defaults() {
        let u = NewUser::new("bob", Some("  "), None, "Bob", "hash".into(), None);
        assert_eq!(u.telegram_username, "bob");
        assert_eq!(u.role_id, DEFAULT_ROLE_ID);

        let u = NewUser::new("bob", Some("@bobby"), Some(42), "Bob", "hash".into(), Some(1));
        assert_eq!(u.telegram_username, "bobby");
        assert_eq!(u.telegram_chat_id, Some(42));
        assert_eq!(u.role_id, 1);
    }

    #[test]
    fn test_hash_not_serialized() {
        let json = serde_json::to_value(user("carol", None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["login"], "carol");
    }

    #[test]
    fn test_role_falls_back_to_default() {
        let mut u = user("erin", None);
        u.role_name = String::new();
        assert_eq!(u.role(), DEFAULT_ROLE_NAME);
        u.role_name = "admin".to_string();
        assert_eq!(u.role(), "admin");
    }

    #[test]
    fn test_inactive_states() {
        let mut u = user("dave", None);
        assert!(u.is_active());
        u.is_archived = true;
        assert!(!u.is_active());
        u.is_archived = false;
        u.is_deleted = true;
        assert!(!u.is_active());
    }
}
