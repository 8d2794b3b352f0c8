//! User roles.
//!
//! Roles live in their own table; users reference them by id and the role
//! name is joined in on every read.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role assigned to self-registered users.
pub const DEFAULT_ROLE_ID: i64 = 3;

/// Name of [`DEFAULT_ROLE_ID`]. Also used when a user row carries no role name.
pub const DEFAULT_ROLE_NAME: &str = "customer";

/// A row of the roles table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Role identifier.
    pub id: i64,
    /// Role name embedded in issued tokens.
    pub name: String,
}

impl Role {
    /// The roles seeded by the initial migration.
    pub fn seeded() -> Vec<Role> {
        [(1, "admin"), (2, "manager"), (DEFAULT_ROLE_ID, DEFAULT_ROLE_NAME)]
            .into_iter()
            .map(|(id, name)| Role {
                id,
                name: name.to_string(),
            })
            .collect()
    }
}
