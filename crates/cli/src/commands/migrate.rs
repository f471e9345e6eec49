//! Database migration command.
//!
//! Applies the SQL migrations from `migrations/` at the workspace root.
//! The server never runs migrations on startup; this command is the
//! only migration path.

use carniceria_server::db;

/// Run pending database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
