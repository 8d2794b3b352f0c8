//! # sso-auth
//!
//! The authentication and token lifecycle engine.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh token issuance and verification
//! - `password`: Argon2id password hashing and policy enforcement
//! - `orchestrator`: login, registration, refresh and password reset flows

pub mod jwt;
pub mod orchestrator;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenPurpose};
pub use orchestrator::{AuthManager, AuthRequest, AuthResponse};
pub use password::{PasswordHasher, PasswordValidator};
