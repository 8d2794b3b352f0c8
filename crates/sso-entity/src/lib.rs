//! # sso-entity
//!
//! Domain entity models for the SSO service. Every struct in this crate
//! represents a database row or a value used to create one. Database
//! entities derive `sqlx::FromRow`.

pub mod password_reset;
pub mod user;
