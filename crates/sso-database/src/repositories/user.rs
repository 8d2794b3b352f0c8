//! User repository implementation.

use sqlx::{PgConnection, PgPool};
use tracing::debug;

use sso_core::error::{AppError, ErrorKind};
use sso_core::result::AppResult;
use sso_entity::user::{NewUser, User, telegram_lookup_key};

use super::store_error;

/// Every read joins the role so `role_name` is populated.
const BASE_SELECT: &str = "\
    SELECT u.id, u.role_id, r.name AS role_name, u.login, u.telegram_username, \
           u.telegram_chat_id, u.telegram_verified, u.full_name, u.password_hash, \
           u.created_at, u.updated_at, u.last_login_at, u.is_archived, u.is_deleted \
    FROM users u \
    JOIN roles r ON r.id = u.role_id";

/// Repository for user queries and credential updates.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active user by login or telegram handle.
    ///
    /// An exact login match wins over a telegram handle match.
    pub async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        debug!(op = "User.FindByLogin", "Looking up user");

        let query = format!(
            "{BASE_SELECT} \
             WHERE (u.login = $1 OR u.telegram_username = $2) \
               AND u.is_deleted = FALSE AND u.is_archived = FALSE \
             ORDER BY (u.login = $1) DESC, u.id \
             LIMIT 1"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .bind(telegram_lookup_key(login))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find user by login", e))
    }

    /// Find a non-deleted user by primary key. Archived users are returned.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| store_error("Failed to acquire connection", e))?;
        select_by_id(&mut *conn, id).await
    }

    /// Insert a user and return its id.
    pub async fn create(&self, user: &NewUser) -> AppResult<i64> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| store_error("Failed to acquire connection", e))?;
        insert(&mut *conn, user).await
    }

    /// Insert a user and read it back inside one transaction.
    pub async fn create_and_load(&self, user: &NewUser) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", e))?;

        let id = insert(&mut *tx, user).await?;
        let created = select_by_id(&mut *tx, id).await?.ok_or_else(|| {
            AppError::store(format!("Created user {id} could not be read back"))
        })?;

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit user creation", e))?;

        Ok(created)
    }

    /// Replace the password hash of a user.
    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| store_error("Failed to acquire connection", e))?;
        set_password(&mut *conn, user_id, password_hash).await
    }
}

pub(crate) async fn select_by_id(conn: &mut PgConnection, id: i64) -> AppResult<Option<User>> {
    let query = format!("{BASE_SELECT} WHERE u.id = $1 AND u.is_deleted = FALSE");

    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| store_error("Failed to find user by id", e))
}

pub(crate) async fn insert(conn: &mut PgConnection, user: &NewUser) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users \
            (role_id, login, telegram_username, telegram_chat_id, telegram_verified, \
             full_name, password_hash, created_at, is_archived, is_deleted) \
         VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7, FALSE, FALSE) \
         RETURNING id",
    )
    .bind(user.role_id)
    .bind(&user.login)
    .bind(&user.telegram_username)
    .bind(user.telegram_chat_id)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        let unique_violation = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique_violation {
            AppError::with_source(ErrorKind::UserAlreadyExists, "User already exists", e)
        } else {
            store_error("Failed to insert user", e)
        }
    })
}

pub(crate) async fn set_password(
    conn: &mut PgConnection,
    user_id: i64,
    password_hash: &str,
) -> AppResult<()> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(conn)
        .await
        .map_err(|e| store_error("Failed to update user password", e))?;
    Ok(())
}
