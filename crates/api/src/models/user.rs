//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clementine_core::{Email, Role, UserId};

/// A registered user (domain type).
///
/// The password hash never leaves [`crate::db::users::UserRepository`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub user_id: UserId,
    /// User's email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Role claim carried into issued bearer tokens.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    /// Argon2 password hash, never the raw password.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}
