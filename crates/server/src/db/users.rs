//! User repository for database operations.

use sqlx::PgPool;

use carniceria_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "
        );

        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no account has the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {USER_COLUMNS}, password_hash
            FROM users
            WHERE email = $1
            "
        );

        let row = sqlx::query_as::<_, UserWithHash>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        role: Role,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO users (name, email, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(email)
            .bind(role)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(row)
    }
}

/// Row shape for the password-hash join; never leaves this module intact.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}
