//! Database operations for the catalog `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `categories` - Catalog sections, grouped for the storefront navigation
//! - `products` - Cuts and goods, each referencing a category by slug
//! - `users` - Staff accounts for the admin surface
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p carniceria-cli -- migrate
//! ```
//!
//! Queries here use runtime-checked `sqlx::query_as` with `FromRow` models
//! so the crate builds without a live database.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod categories;
pub mod products;
pub mod users;

pub use categories::CategoryRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed domain validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A write referenced a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
