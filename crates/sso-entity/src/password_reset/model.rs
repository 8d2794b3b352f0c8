//! Password reset grant entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifetime of a freshly minted reset grant.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// A single-use, time-boxed credential recovery grant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    /// Internal identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Opaque value handed to the user.
    #[serde(skip_serializing)]
    pub token: String,
    /// The grant is unusable from this instant on.
    pub expires_at: DateTime<Utc>,
    /// Set when the grant was redeemed.
    pub consumed_at: Option<DateTime<Utc>>,
    /// Set together with `consumed_at`.
    pub is_revoked: bool,
    /// When the grant was minted.
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// A grant is usable iff it is not revoked, not consumed and not expired.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && self.consumed_at.is_none() && now < self.expires_at
    }

    /// Marks the grant consumed and revoked in one step.
    pub fn consume(&mut self, now: DateTime<Utc>) {
        self.consumed_at = Some(now);
        self.is_revoked = true;
    }
}
