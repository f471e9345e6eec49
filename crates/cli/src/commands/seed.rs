//! Seed the catalog from a YAML file.
//!
//! The file holds accounts, categories, and products; see
//! `seeds/catalog.yaml` for the expected shape. Seeding is additive:
//! entries whose unique keys already exist are skipped with a warning
//! rather than overwritten, so the command is safe to re-run.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use carniceria_core::{Price, Role, Slug, UnitType};
use carniceria_server::db::{self, CategoryRepository, ProductRepository, RepositoryError};
use carniceria_server::services::auth::AuthService;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    categories: Vec<SeedCategory>,
    #[serde(default)]
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    name: String,
    email: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedCategory {
    name: String,
    category_principal: String,
    #[serde(default = "default_position", rename = "order")]
    position: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProduct {
    name: String,
    description: String,
    category_slug: Slug,
    price: Price,
    #[serde(default)]
    stock: i32,
    #[serde(default)]
    unit_type: UnitType,
    #[serde(default = "default_available")]
    is_available: bool,
    #[serde(default, rename = "imageURL")]
    image_url: Option<String>,
}

const fn default_position() -> i32 {
    99
}

const fn default_available() -> bool {
    true
}

/// Seed the database from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a
/// database operation fails for a reason other than a duplicate.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let auth = AuthService::new(&pool);
    let mut created = 0_u32;
    let mut skipped = 0_u32;

    for user in &seed.users {
        match auth
            .register(&user.name, &user.email, &user.password, user.role)
            .await
        {
            Ok(_) => created += 1,
            Err(carniceria_server::services::auth::AuthError::UserAlreadyExists) => {
                warn!(email = %user.email, "Account already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let categories = CategoryRepository::new(&pool);
    for category in &seed.categories {
        let slug = Slug::derive(&category.name)?;
        match categories
            .create(
                &category.name,
                &slug,
                &category.category_principal,
                category.position,
            )
            .await
        {
            Ok(_) => created += 1,
            Err(RepositoryError::Conflict(_)) => {
                warn!(slug = %slug, "Category already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let products = ProductRepository::new(&pool);
    for product in &seed.products {
        let slug = Slug::derive(&product.name)?;
        match products
            .create(
                &product.name,
                &slug,
                &product.description,
                product.image_url.as_deref(),
                &product.category_slug,
                product.price,
                product.stock,
                product.unit_type,
                product.is_available,
            )
            .await
        {
            Ok(_) => created += 1,
            Err(RepositoryError::Conflict(_)) => {
                warn!(slug = %slug, "Product already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(created, skipped, "Seeding complete");
    Ok(())
}
