//! Category route handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use carniceria_core::Slug;

use crate::db::categories::{CategoryRepository, CategoryUpdate};
use crate::error::{AppError, FieldError, Result};
use crate::middleware::RequireCatalogWrite;
use crate::models::Category;
use crate::state::AppState;

/// Sort position assigned when the request omits one; late enough that
/// explicitly ordered categories come first.
const DEFAULT_POSITION: i32 = 99;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub category_principal: String,
    #[serde(rename = "order")]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub category_principal: Option<String>,
    #[serde(rename = "order")]
    pub position: Option<i32>,
}

/// `GET /api/categories` - categories grouped by principal name.
pub async fn list(State(state): State<AppState>) -> Result<Json<BTreeMap<String, Vec<Category>>>> {
    let grouped = CategoryRepository::new(state.pool()).list_grouped().await?;
    Ok(Json(grouped))
}

/// `POST /api/categories` - create a category (admin or editor).
pub async fn create(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = body.name.trim();
    let principal = body.category_principal.trim();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::missing("name"));
    }
    if principal.is_empty() {
        errors.push(FieldError::missing("categoryPrincipal"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let slug = Slug::derive(name).map_err(|e| {
        AppError::invalid_field("name", format!("cannot derive a slug: {e}"), Some(name))
    })?;

    let repo = CategoryRepository::new(state.pool());

    if repo.name_exists(name, None).await? {
        return Err(AppError::invalid_field(
            "name",
            "a category with this name already exists",
            Some(name),
        ));
    }

    let category = repo
        .create(
            name,
            &slug,
            principal,
            body.position.unwrap_or(DEFAULT_POSITION),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /api/categories/{slug}` - update a category (admin or editor).
///
/// The slug never changes, so product references stay valid.
pub async fn update(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    Path(slug): Path<Slug>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    let repo = CategoryRepository::new(state.pool());

    if let Some(name) = body.name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(vec![FieldError::missing("name")]));
        }
        if repo.name_exists(name, Some(&slug)).await? {
            return Err(AppError::invalid_field(
                "name",
                "a category with this name already exists",
                Some(name),
            ));
        }
    }

    let update = CategoryUpdate {
        name: body.name.map(|n| n.trim().to_owned()),
        category_principal: body.category_principal,
        position: body.position,
    };

    let category = repo.update(&slug, &update).await?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{slug}` - delete a category (admin or editor).
///
/// Refused while products still reference the category.
pub async fn delete(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    Path(slug): Path<Slug>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
