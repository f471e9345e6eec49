//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;

/// Resolve the database URL from the environment.
///
/// Prefers `CARNICERIA_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither variable is set.
pub fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    std::env::var("CARNICERIA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "CARNICERIA_DATABASE_URL (or DATABASE_URL) not set".into())
}
