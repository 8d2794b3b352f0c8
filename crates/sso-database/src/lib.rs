//! # sso-database
//!
//! The credential store contract consumed by the auth engine, plus its
//! PostgreSQL implementation (connection pool, migrations, repositories)
//! and a process-local implementation.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
