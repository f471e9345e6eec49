//! Category model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use carniceria_core::{CategoryId, Slug};

/// A catalog section, nested under a principal group for navigation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    /// Top-level grouping name this category is nested under.
    pub category_principal: String,
    /// Sort position within its principal group. Defaults to 99 so
    /// unordered categories sink to the end.
    #[serde(rename = "order")]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
