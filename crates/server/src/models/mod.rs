//! Row models for the catalog database.
//!
//! Each model derives `sqlx::FromRow` for runtime-checked queries and
//! serializes with the camelCase field names the storefront expects.

pub mod category;
pub mod product;
pub mod user;

pub use category::Category;
pub use product::Product;
pub use user::User;
