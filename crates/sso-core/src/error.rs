//! Unified application error types for the SSO service.
//!
//! Every crate maps its internal errors into [`AppError`] so failures
//! propagate through the `?` operator with a single type. The [`ErrorKind`]
//! carries the typed failure the caller branches on; the message is for
//! humans and logs.

use std::fmt;
use thiserror::Error;

/// Failure categories surfaced by the authentication engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Login unknown or password wrong. Deliberately indistinguishable.
    InvalidCredentials,
    /// Registration attempted for a login that is already taken.
    UserAlreadyExists,
    /// The user referenced by a token no longer exists or is archived.
    UserNotFound,
    /// Bad signature, expired, or wrong token purpose.
    InvalidToken,
    /// The token cannot be parsed or is signed with an unexpected algorithm.
    MalformedToken,
    /// The token verified but its claim set does not have the expected shape.
    CorruptClaims,
    /// Reset grant unknown, revoked, consumed or expired.
    InvalidResetToken,
    /// Input validation failed.
    Validation,
    /// The credential store failed.
    Store,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this failure is caused by the caller's input rather than by
    /// an operational problem.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Store | Self::Configuration | Self::Serialization | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::UserAlreadyExists => write!(f, "USER_ALREADY_EXISTS"),
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::MalformedToken => write!(f, "MALFORMED_TOKEN"),
            Self::CorruptClaims => write!(f, "CORRUPT_CLAIMS"),
            Self::InvalidResetToken => write!(f, "INVALID_RESET_TOKEN"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Store => write!(f, "STORE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout the SSO service.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Prefixes the message with the name of the operation that failed.
    ///
    /// The kind is preserved so callers can still branch on it.
    pub fn in_operation(mut self, op: &str) -> Self {
        self.message = format!("{op}: {}", self.message);
        self
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create the single error shared by unknown logins and wrong passwords.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid login or password")
    }

    /// Create a user-already-exists error.
    pub fn user_already_exists() -> Self {
        Self::new(ErrorKind::UserAlreadyExists, "User already exists")
    }

    /// Create a user-not-found error.
    pub fn user_not_found() -> Self {
        Self::new(ErrorKind::UserNotFound, "User not found")
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create a malformed-token error.
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Create a corrupt-claims error.
    pub fn corrupt_claims(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptClaims, message)
    }

    /// Create an invalid-reset-token error.
    pub fn invalid_reset_token() -> Self {
        Self::new(
            ErrorKind::InvalidResetToken,
            "Password reset token is invalid or expired",
        )
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
