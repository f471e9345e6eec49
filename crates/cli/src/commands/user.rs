//! Staff account creation command.

use tracing::info;

use carniceria_core::Role;
use carniceria_server::db;
use carniceria_server::services::auth::AuthService;

/// Create a staff account.
///
/// # Errors
///
/// Returns an error for an unknown role, an invalid email, a weak
/// password, or a duplicate account.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let role: Role = role
        .parse()
        .map_err(|_| format!("unknown role '{role}', expected 'admin' or 'editor'"))?;

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let user = AuthService::new(&pool)
        .register(name, email, password, role)
        .await?;

    info!(id = %user.id.as_i32(), email = %user.email, role = %user.role, "Account created");
    Ok(())
}
