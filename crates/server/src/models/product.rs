//! Product model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use carniceria_core::{Price, ProductId, Slug, UnitType};

/// A cut or good in the catalog.
///
/// `image_url` stays `None` until an upload completes; the storefront
/// shows a placeholder for those. Products referencing a category do so
/// by the category's slug, which is immutable once products depend on it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub category_slug: Slug,
    pub price: Price,
    pub stock: i32,
    pub unit_type: UnitType,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
