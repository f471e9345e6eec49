//! Product repository for database operations.
//!
//! Public browse and search queries filter to available products;
//! lookup by slug does not, so direct links keep working while a
//! product is temporarily unavailable.

use sqlx::PgPool;

use carniceria_core::{Price, Slug, UnitType};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, image_url, category_slug, \
                               price, stock, unit_type, is_available, created_at, updated_at";

/// Filters for the public product listing.
#[derive(Debug, Default)]
pub struct ProductFilter {
    /// Exact category slug match.
    pub category: Option<Slug>,
    /// Case-insensitive substring over the product name.
    pub query: Option<String>,
    /// Result-count cap.
    pub limit: Option<i64>,
}

/// Fields accepted when updating a product. `None` leaves the stored
/// value untouched, so explicit zero and `false` survive the trip.
#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_slug: Option<Slug>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub unit_type: Option<UnitType>,
    pub is_available: Option<bool>,
    /// Resolved image URL; `None` retains the existing one.
    pub image_url: Option<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List available products, optionally filtered by category, name
    /// substring, and a result cap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_available = TRUE
              AND ($1::text IS NULL OR category_slug = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY name ASC
            LIMIT $3
            "
        );

        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.category.as_ref().map(Slug::as_str))
            .bind(filter.query.as_deref())
            .bind(filter.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a product by its slug, regardless of availability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE slug = $1
            "
        );

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// List available products whose category slug contains the given
    /// fragment, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_available = TRUE
              AND category_slug ILIKE '%' || $1 || '%'
            ORDER BY name ASC
            "
        );

        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(fragment)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Search available products by substring over name or description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_available = TRUE
              AND (name ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
            ORDER BY name ASC
            "
        );

        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Create a new product.
    ///
    /// The category-exists check happens inside the insert itself, so a
    /// concurrent category delete cannot slip in between.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the category slug
    /// does not resolve.
    /// Returns `RepositoryError::Conflict` if the product slug exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        slug: &Slug,
        description: &str,
        image_url: Option<&str>,
        category_slug: &Slug,
        price: Price,
        stock: i32,
        unit_type: UnitType,
        is_available: bool,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO products
                (name, slug, description, image_url, category_slug,
                 price, stock, unit_type, is_available)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE EXISTS (SELECT 1 FROM categories WHERE slug = $5)
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(image_url)
            .bind(category_slug)
            .bind(price)
            .bind(stock)
            .bind(unit_type)
            .bind(is_available)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return if db_err.constraint() == Some("products_name_lower_idx") {
                        RepositoryError::Conflict(format!("a product named '{name}' already exists"))
                    } else {
                        RepositoryError::Conflict(format!(
                            "a product with slug '{slug}' already exists"
                        ))
                    };
                }
                RepositoryError::Database(e)
            })?;

        row.ok_or_else(|| {
            RepositoryError::MissingReference(format!("category '{category_slug}' does not exist"))
        })
    }

    /// Update a product in place, keeping its slug.
    ///
    /// Only the fields present in `update` are overwritten. When the
    /// category changes, its existence is re-validated inside the same
    /// statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the slug.
    /// Returns `RepositoryError::MissingReference` if a changed category
    /// slug does not resolve.
    /// Returns `RepositoryError::Conflict` if a renamed product collides
    /// with another product's name.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        slug: &Slug,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category_slug = COALESCE($4, category_slug),
                price = COALESCE($5, price),
                stock = COALESCE($6, stock),
                unit_type = COALESCE($7, unit_type),
                is_available = COALESCE($8, is_available),
                image_url = COALESCE($9, image_url),
                updated_at = NOW()
            WHERE slug = $1
              AND ($4::text IS NULL OR EXISTS (SELECT 1 FROM categories WHERE slug = $4))
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .bind(update.name.as_deref())
            .bind(update.description.as_deref())
            .bind(update.category_slug.as_ref().map(Slug::as_str))
            .bind(update.price)
            .bind(update.stock)
            .bind(update.unit_type)
            .bind(update.is_available)
            .bind(update.image_url.as_deref())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    let name = update.name.as_deref().unwrap_or_default();
                    return RepositoryError::Conflict(format!(
                        "a product named '{name}' already exists"
                    ));
                }
                RepositoryError::Database(e)
            })?;

        if let Some(product) = row {
            return Ok(product);
        }

        // The statement matched nothing: either the product is gone or the
        // new category does not exist. Tell them apart for the caller.
        if self.get_by_slug(slug).await?.is_some() {
            let category = update
                .category_slug
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            return Err(RepositoryError::MissingReference(format!(
                "category '{category}' does not exist"
            )));
        }

        Err(RepositoryError::NotFound)
    }

    /// Delete a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the slug.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, slug: &Slug) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM products WHERE slug = $1
            ",
        )
        .bind(slug)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
