//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (public)
//! GET    /api/categories                    - Categories grouped by principal
//! GET    /api/products                      - Product listing (available only)
//! GET    /api/products/search?q=            - Name/description search
//! GET    /api/products/category/{slug}      - Products in a category
//! GET    /api/products/{slug}               - Product detail
//!
//! # Catalog (admin or editor)
//! POST   /api/products                      - Create product (multipart)
//! PUT    /api/products/{slug}               - Update product (multipart)
//! DELETE /api/products/{slug}               - Delete product
//! POST   /api/categories                    - Create category
//! PUT    /api/categories/{slug}             - Update category
//! DELETE /api/categories/{slug}             - Delete category
//! POST   /api/uploads                       - Upload a product image
//!
//! # Accounts
//! POST   /api/users/login                   - Login, returns token + profile
//! POST   /api/users/register                - Create staff account (admin only)
//! GET    /api/users/profile                 - Current account (authenticated)
//! ```

pub mod categories;
pub mod products;
pub mod uploads;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{slug}",
            axum::routing::put(categories::update).delete(categories::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/search", get(products::search))
        .route("/category/{slug}", get(products::list_by_category))
        .route(
            "/{slug}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(users::login))
        .route("/register", post(users::register))
        .route("/profile", get(users::profile))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/", post(uploads::upload))
}

/// Assemble all API routes under one router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .nest("/uploads", upload_routes())
}
