//! Product route handlers.
//!
//! The admin surface submits products as multipart forms, so every
//! field arrives as text (with an optional image file alongside).
//! Coercion happens here, collecting one [`FieldError`] per rejected
//! field instead of failing on the first.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use carniceria_core::{Price, Slug, UnitType};

use crate::db::products::{ProductFilter, ProductRepository, ProductUpdate};
use crate::error::{AppError, FieldError, Result};
use crate::middleware::RequireCatalogWrite;
use crate::models::Product;
use crate::routes::uploads;
use crate::state::AppState;

/// Hard cap on list results, applied on top of any requested limit.
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<Slug>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `GET /api/products?category=&q=&limit=` - available products.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category: query.category,
        query: query.q,
        limit: Some(query.limit.map_or(MAX_LIMIT, |l| l.clamp(1, MAX_LIMIT))),
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// `GET /api/products/search?q=` - substring search over name and
/// description, available products only.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::missing("q")]));
    }

    let products = ProductRepository::new(state.pool()).search(&q).await?;
    Ok(Json(products))
}

/// `GET /api/products/category/{slug}` - available products in a
/// category. Responds not-found when the result set is empty; an empty
/// category and a missing one are not distinguished.
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_category(&slug)
        .await?;

    if products.is_empty() {
        return Err(AppError::NotFound(format!(
            "no products in category '{slug}'"
        )));
    }

    Ok(Json(products))
}

/// `GET /api/products/{slug}` - product detail, regardless of
/// availability.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<Slug>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    Ok(Json(product))
}

/// `POST /api/products` - create a product (admin or editor).
pub async fn create(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = ProductForm::read(multipart).await?;
    let mut errors = Vec::new();

    let name = match form.text.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_owned()),
        _ => {
            errors.push(FieldError::missing("name"));
            None
        }
    };
    let description = form.text.description.clone().unwrap_or_else(|| {
        errors.push(FieldError::missing("description"));
        String::new()
    });
    let category_slug = match form.text.category_slug.as_deref() {
        Some(raw) => parse_slug_field("categorySlug", raw, &mut errors),
        None => {
            errors.push(FieldError::missing("categorySlug"));
            None
        }
    };
    let price = match form.text.price.as_deref() {
        Some(raw) => parse_price_field(raw, &mut errors),
        None => {
            errors.push(FieldError::missing("price"));
            None
        }
    };
    let stock = form
        .text
        .stock
        .as_deref()
        .and_then(|raw| parse_stock_field(raw, &mut errors))
        .unwrap_or(0);
    let unit_type = form
        .text
        .unit_type
        .as_deref()
        .and_then(|raw| parse_unit_field(raw, &mut errors))
        .unwrap_or_default();
    let is_available = form
        .text
        .is_available
        .as_deref()
        .and_then(|raw| parse_bool_field("isAvailable", raw, &mut errors))
        .unwrap_or(true);

    let slug = name
        .as_deref()
        .and_then(|name| match Slug::derive(name) {
            Ok(slug) => Some(slug),
            Err(e) => {
                errors.push(FieldError::new(
                    "name",
                    format!("cannot derive a slug: {e}"),
                    Some(name),
                ));
                None
            }
        });

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // All Nones were reported above.
    let (name, category_slug, price, slug) = match (name, category_slug, price, slug) {
        (Some(n), Some(c), Some(p), Some(s)) => (n, c, p, s),
        _ => return Err(AppError::Internal("form validation out of sync".to_owned())),
    };

    let image_url = match form.image {
        Some(image) => Some(uploads::store_image(state.config(), &image).await?),
        None => nonblank(form.text.image_url),
    };

    let product = ProductRepository::new(state.pool())
        .create(
            &name,
            &slug,
            &description,
            image_url.as_deref(),
            &category_slug,
            price,
            stock,
            unit_type,
            is_available,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{slug}` - update a product (admin or editor).
///
/// Only fields present in the form are overwritten, so an explicit
/// zero or `false` is applied while an absent field is left alone.
/// Image resolution: a new file wins, else a text URL, else the stored
/// image is retained.
pub async fn update(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    Path(slug): Path<Slug>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let form = ProductForm::read(multipart).await?;
    let mut errors = Vec::new();

    let category_slug = form
        .text
        .category_slug
        .as_deref()
        .and_then(|raw| parse_slug_field("categorySlug", raw, &mut errors));
    let price = form
        .text
        .price
        .as_deref()
        .and_then(|raw| parse_price_field(raw, &mut errors));
    let stock = form
        .text
        .stock
        .as_deref()
        .and_then(|raw| parse_stock_field(raw, &mut errors));
    let unit_type = form
        .text
        .unit_type
        .as_deref()
        .and_then(|raw| parse_unit_field(raw, &mut errors));
    let is_available = form
        .text
        .is_available
        .as_deref()
        .and_then(|raw| parse_bool_field("isAvailable", raw, &mut errors));

    if let Some(name) = form.text.name.as_deref()
        && name.trim().is_empty()
    {
        errors.push(FieldError::new("name", "must not be empty", Some(name)));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let image_url = match form.image {
        Some(image) => Some(uploads::store_image(state.config(), &image).await?),
        None => nonblank(form.text.image_url),
    };

    let update = ProductUpdate {
        name: form.text.name.map(|n| n.trim().to_owned()),
        description: form.text.description,
        category_slug,
        price,
        stock,
        unit_type,
        is_available,
        image_url,
    };

    let product = ProductRepository::new(state.pool())
        .update(&slug, &update)
        .await?;

    Ok(Json(product))
}

/// `DELETE /api/products/{slug}` - delete a product (admin or editor).
pub async fn delete(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    Path(slug): Path<Slug>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Multipart form parsing
// =============================================================================

/// Text fields of the product form, all raw strings.
#[derive(Debug, Default)]
struct ProductFormText {
    name: Option<String>,
    description: Option<String>,
    category_slug: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    unit_type: Option<String>,
    is_available: Option<String>,
    image_url: Option<String>,
}

/// A product form split into text fields and the optional image file.
struct ProductForm {
    text: ProductFormText,
    image: Option<uploads::ImageUpload>,
}

impl ProductForm {
    /// Drain a multipart stream into named fields.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut text = ProductFormText::default();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::invalid_field("body", &e.to_string(), None))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_field("image", &e.to_string(), None))?;
                if !data.is_empty() {
                    image = Some(uploads::ImageUpload { file_name, data });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::invalid_field(&name, &e.to_string(), None))?;

            match name.as_str() {
                "name" => text.name = Some(value),
                "description" => text.description = Some(value),
                "categorySlug" => text.category_slug = Some(value),
                "price" => text.price = Some(value),
                "stock" => text.stock = Some(value),
                "unitType" => text.unit_type = Some(value),
                "isAvailable" => text.is_available = Some(value),
                "imageUrl" => text.image_url = Some(value),
                _ => {}
            }
        }

        Ok(Self { text, image })
    }
}

/// A blank `imageUrl` text part means "not provided", not "clear the
/// stored image".
fn nonblank(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.trim().is_empty())
}

fn parse_slug_field(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<Slug> {
    match Slug::parse(raw.trim()) {
        Ok(slug) => Some(slug),
        Err(e) => {
            errors.push(FieldError::new(field, e.to_string(), Some(raw)));
            None
        }
    }
}

fn parse_price_field(raw: &str, errors: &mut Vec<FieldError>) -> Option<Price> {
    match Price::parse(raw.trim()) {
        Ok(price) => Some(price),
        Err(e) => {
            errors.push(FieldError::new("price", e.to_string(), Some(raw)));
            None
        }
    }
}

fn parse_stock_field(raw: &str, errors: &mut Vec<FieldError>) -> Option<i32> {
    match raw.trim().parse::<i32>() {
        Ok(stock) if stock >= 0 => Some(stock),
        Ok(_) => {
            errors.push(FieldError::new("stock", "must not be negative", Some(raw)));
            None
        }
        Err(_) => {
            errors.push(FieldError::new("stock", "must be an integer", Some(raw)));
            None
        }
    }
}

fn parse_unit_field(raw: &str, errors: &mut Vec<FieldError>) -> Option<UnitType> {
    match raw.trim().parse::<UnitType>() {
        Ok(unit) => Some(unit),
        Err(_) => {
            errors.push(FieldError::new(
                "unitType",
                "must be one of Kg, Paquete, Pieza",
                Some(raw),
            ));
            None
        }
    }
}

fn parse_bool_field(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            errors.push(FieldError::new(field, "must be true or false", Some(raw)));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion() {
        let mut errors = Vec::new();
        assert_eq!(parse_bool_field("isAvailable", "TRUE", &mut errors), Some(true));
        assert_eq!(parse_bool_field("isAvailable", "0", &mut errors), Some(false));
        assert!(errors.is_empty());

        assert_eq!(parse_bool_field("isAvailable", "yes", &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "isAvailable");
    }

    #[test]
    fn test_stock_coercion_allows_explicit_zero() {
        let mut errors = Vec::new();
        assert_eq!(parse_stock_field("0", &mut errors), Some(0));
        assert!(errors.is_empty());

        assert_eq!(parse_stock_field("-3", &mut errors), None);
        assert_eq!(parse_stock_field("many", &mut errors), None);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_blank_image_url_is_treated_as_absent() {
        assert_eq!(nonblank(None), None);
        assert_eq!(nonblank(Some(String::new())), None);
        assert_eq!(nonblank(Some("   ".to_owned())), None);
        assert_eq!(
            nonblank(Some("/uploads/products/x.jpg".to_owned())),
            Some("/uploads/products/x.jpg".to_owned())
        );
    }

    #[test]
    fn test_price_coercion_collects_field_error() {
        let mut errors = Vec::new();
        assert!(parse_price_field("189.50", &mut errors).is_some());
        assert!(parse_price_field("-1", &mut errors).is_none());
        assert!(parse_price_field("caro", &mut errors).is_none());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field == "price"));
    }
}
