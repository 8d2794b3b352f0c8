//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use sso_core::config::AuthConfig;
use sso_core::error::AppError;

use super::claims::{Claims, RawClaims, TokenPurpose};

/// Validates JWT tokens against the process secret.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TokenPurpose::Access)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TokenPurpose::Refresh)
    }

    /// Verifies `token` and checks that it was issued for `expected`.
    ///
    /// Checks, in order:
    /// 1. The header parses and names HS256 (`MalformedToken` otherwise)
    /// 2. Signature and expiration (`InvalidToken`)
    /// 3. The claim set has exactly the expected shape (`CorruptClaims`)
    /// 4. The purpose matches (`InvalidToken`)
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::malformed_token(format!("Unparseable token: {e}")))?;
        if header.alg != Algorithm::HS256 {
            return Err(AppError::malformed_token(format!(
                "Unexpected signing algorithm: {:?}",
                header.alg
            )));
        }

        let token_data = decode::<serde_json::Value>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::invalid_token("Token has expired"),
                JwtErrorKind::InvalidSignature => {
                    AppError::invalid_token("Invalid token signature")
                }
                JwtErrorKind::ImmatureSignature => AppError::invalid_token("Token not yet valid"),
                JwtErrorKind::InvalidToken
                | JwtErrorKind::InvalidAlgorithm
                | JwtErrorKind::Base64(_)
                | JwtErrorKind::Json(_)
                | JwtErrorKind::Utf8(_) => {
                    AppError::malformed_token(format!("Invalid token format: {e}"))
                }
                _ => AppError::corrupt_claims(format!("Token claims rejected: {e}")),
            })?;

        let raw: RawClaims = serde_json::from_value(token_data.claims)
            .map_err(|e| AppError::corrupt_claims(format!("Unexpected claim set: {e}")))?;

        raw.with_purpose(expected).ok_or_else(|| {
            AppError::invalid_token(format!("Invalid token type: expected {expected} token"))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sso_core::error::ErrorKind;

    use super::*;
    use crate::jwt::encoder::{JwtEncoder, REFRESH_TTL_DAYS};

    const SECRET: &str = "unit-test-secret";

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            access_ttl_minutes: 15,
            password_min_length: 8,
        }
    }

    fn sign_raw(alg: Algorithm, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 600
    }

    #[test]
    fn test_issue_then_verify() {
        let cfg = config(SECRET);
        let pair = JwtEncoder::new(&cfg).issue(42, "manager").unwrap();
        let decoder = JwtDecoder::new(&cfg);

        let access = decoder.decode_access_token(&pair.access_token).unwrap();
        assert_eq!(access.user_id(), 42);
        assert_eq!(access.role, "manager");
        assert_eq!(access.typ, TokenPurpose::Access);
        assert_eq!(access.exp, pair.access_expires_at.timestamp());

        let refresh = decoder.decode_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.typ, TokenPurpose::Refresh);
        let lifetime = pair.refresh_expires_at - pair.access_expires_at;
        assert!(lifetime.num_days() >= REFRESH_TTL_DAYS - 1);
    }

    #[test]
    fn test_purpose_mismatch_is_invalid_token() {
        let cfg = config(SECRET);
        let pair = JwtEncoder::new(&cfg).issue(1, "customer").unwrap();
        let decoder = JwtDecoder::new(&cfg);

        let err = decoder.decode_refresh_token(&pair.access_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        let err = decoder.decode_access_token(&pair.refresh_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_wrong_secret_is_invalid_token() {
        let pair = JwtEncoder::new(&config("other-secret")).issue(1, "customer").unwrap();
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&pair.access_token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_expired_is_invalid_token() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({
                "sub": 1, "role": "customer", "typ": "access",
                "exp": Utc::now().timestamp() - 120
            }),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_other_algorithm_is_malformed() {
        let token = sign_raw(
            Algorithm::HS384,
            &serde_json::json!({"sub": 1, "role": "customer", "typ": "access", "exp": future_exp()}),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedToken);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let decoder = JwtDecoder::new(&config(SECRET));
        for token in ["", "not-a-token", "a.b.c"] {
            let err = decoder.decode_access_token(token).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedToken, "token {token:?}");
        }
    }

    #[test]
    fn test_unrecognised_purpose_is_invalid_token() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({"sub": 1, "role": "customer", "typ": "reset", "exp": future_exp()}),
        );
        let decoder = JwtDecoder::new(&config(SECRET));
        let err = decoder.decode_refresh_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        let err = decoder.decode_access_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_missing_or_mistyped_purpose_is_corrupt() {
        let decoder = JwtDecoder::new(&config(SECRET));
        for claims in [
            serde_json::json!({"sub": 1, "role": "customer", "exp": future_exp()}),
            serde_json::json!({"sub": 1, "role": "customer", "typ": 1, "exp": future_exp()}),
        ] {
            let token = sign_raw(Algorithm::HS256, &claims);
            let err = decoder.decode_refresh_token(&token).unwrap_err();
            assert_eq!(err.kind, ErrorKind::CorruptClaims, "claims {claims}");
        }
    }

    #[test]
    fn test_missing_subject_is_corrupt() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({"role": "customer", "typ": "access", "exp": future_exp()}),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CorruptClaims);
    }

    #[test]
    fn test_wrong_subject_shape_is_corrupt() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({"sub": "1", "role": "customer", "typ": "access", "exp": future_exp()}),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CorruptClaims);
    }

    #[test]
    fn test_missing_expiry_is_corrupt() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({"sub": 1, "role": "customer", "typ": "access"}),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CorruptClaims);
    }

    #[test]
    fn test_extra_claim_is_corrupt() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({
                "sub": 1, "role": "customer", "typ": "access",
                "exp": future_exp(), "admin": true
            }),
        );
        let err = JwtDecoder::new(&config(SECRET))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CorruptClaims);
    }
}
