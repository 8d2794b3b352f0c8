//! JWT claims structure shared by access and refresh tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims payload embedded in every token.
///
/// The claim set is fixed: decoding rejects tokens carrying any other key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: i64,
    /// Role name at the time of issuance.
    pub role: String,
    /// What the token may be used for.
    pub typ: TokenPurpose,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claim set as it arrives on the wire, before the purpose is checked.
///
/// `typ` stays a plain string so an unrecognised purpose can be told apart
/// from a claim set of the wrong shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawClaims {
    pub sub: i64,
    pub role: String,
    pub typ: String,
    pub exp: i64,
}

impl RawClaims {
    /// Typed claims if `typ` names `expected`, `None` otherwise.
    pub fn with_purpose(self, expected: TokenPurpose) -> Option<Claims> {
        (self.typ == expected.as_str()).then(|| Claims {
            sub: self.sub,
            role: self.role,
            typ: expected,
            exp: self.exp,
        })
    }
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Short-lived token for API requests.
    Access,
    /// Long-lived token for obtaining a new pair.
    Refresh,
}

impl TokenPurpose {
    /// Wire name of the purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let claims = Claims {
            sub: 7,
            role: "customer".to_string(),
            typ: TokenPurpose::Refresh,
            exp: 1_700_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sub": 7, "role": "customer", "typ": "refresh", "exp": 1_700_000_000})
        );
        assert_eq!(claims.expires_at().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_unknown_claim_rejected() {
        let value = serde_json::json!({
            "sub": 1, "role": "admin", "typ": "access", "exp": 10, "jti": "x"
        });
        assert!(serde_json::from_value::<Claims>(value).is_err());
    }

    #[test]
    fn test_unknown_claim_rejected_on_the_wire() {
        let value = serde_json::json!({
            "sub": 1, "role": "admin", "typ": "access", "exp": 10, "jti": "x"
        });
        assert!(serde_json::from_value::<RawClaims>(value).is_err());
    }

    #[test]
    fn test_purpose_selection() {
        let value = serde_json::json!({"sub": 1, "role": "admin", "typ": "reset", "exp": 10});
        let raw: RawClaims = serde_json::from_value(value).unwrap();
        assert!(raw.clone().with_purpose(TokenPurpose::Access).is_none());
        assert!(raw.with_purpose(TokenPurpose::Refresh).is_none());

        let value = serde_json::json!({"sub": 1, "role": "admin", "typ": "refresh", "exp": 10});
        let raw: RawClaims = serde_json::from_value(value).unwrap();
        let claims = raw.with_purpose(TokenPurpose::Refresh).unwrap();
        assert_eq!(claims.typ, TokenPurpose::Refresh);
        assert_eq!(claims.user_id(), 1);
    }

    #[test]
    fn test_non_string_purpose_rejected() {
        let value = serde_json::json!({"sub": 1, "role": "admin", "typ": 3, "exp": 10});
        assert!(serde_json::from_value::<RawClaims>(value).is_err());
    }
}
