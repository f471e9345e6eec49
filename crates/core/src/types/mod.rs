//! Core types for Carniceria.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod slug;
pub mod unit;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::{Capability, Role};
pub use slug::{Slug, SlugError};
pub use unit::UnitType;
