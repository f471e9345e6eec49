//! User model for staff accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use carniceria_core::{Email, Role, UserId};

/// A staff account. The password hash never leaves the database layer;
/// see [`crate::db::UserRepository::get_with_password_hash`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
