//! User domain entities.

pub mod model;
pub mod role;

pub use model::{NewUser, User, telegram_lookup_key};
pub use role::{DEFAULT_ROLE_ID, DEFAULT_ROLE_NAME, Role};
