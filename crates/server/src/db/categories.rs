//! Category repository for database operations.

use std::collections::BTreeMap;

use sqlx::PgPool;

use carniceria_core::Slug;

use super::RepositoryError;
use crate::models::Category;

/// Fields accepted when updating a category. `None` leaves the stored
/// value untouched.
#[derive(Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub category_principal: Option<String>,
    pub position: Option<i32>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories grouped by principal name.
    ///
    /// Categories within each group keep their `(position, name)` order;
    /// the `BTreeMap` keeps the principal names themselves sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_grouped(&self) -> Result<BTreeMap<String, Vec<Category>>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, category_principal, position, created_at, updated_at
            FROM categories
            ORDER BY category_principal ASC, position ASC, name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut grouped: BTreeMap<String, Vec<Category>> = BTreeMap::new();
        for category in rows {
            grouped
                .entry(category.category_principal.clone())
                .or_default()
                .push(category);
        }

        Ok(grouped)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, category_principal, position, created_at, updated_at
            FROM categories
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Check whether a category name is already taken, case-insensitively.
    ///
    /// `exclude` skips one slug so an update does not collide with itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(
        &self,
        name: &str,
        exclude: Option<&Slug>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE LOWER(name) = LOWER($1)
                  AND ($2::text IS NULL OR slug <> $2)
            )
            ",
        )
        .bind(name)
        .bind(exclude.map(Slug::as_str))
        .fetch_one(self.pool)
        .await?;

        Ok(taken)
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        slug: &Slug,
        category_principal: &str,
        position: i32,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO categories (name, slug, category_principal, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, category_principal, position, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(category_principal)
        .bind(position)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row)
    }

    /// Update a category in place, keeping its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has the slug.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        slug: &Slug,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            UPDATE categories
            SET name = COALESCE($2, name),
                category_principal = COALESCE($3, category_principal),
                position = COALESCE($4, position),
                updated_at = NOW()
            WHERE slug = $1
            RETURNING id, name, slug, category_principal, position, created_at, updated_at
            ",
        )
        .bind(slug)
        .bind(update.name.as_deref())
        .bind(update.category_principal.as_deref())
        .bind(update.position)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.ok_or(RepositoryError::NotFound)
    }

    /// Delete a category, refusing while products still reference it.
    ///
    /// The dependent-product check produces the friendly conflict
    /// message; a product inserted concurrently after the count is
    /// caught by the `category_slug` foreign key instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has the slug.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, slug: &Slug) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let dependents = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM products WHERE category_slug = $1
            ",
        )
        .bind(slug)
        .fetch_one(&mut *tx)
        .await?;

        if dependents > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category still has {dependents} product(s)"
            )));
        }

        let result = sqlx::query(
            r"
            DELETE FROM categories WHERE slug = $1
            ",
        )
        .bind(slug)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
