//! Carniceria Core - Shared types library.
//!
//! This crate provides common types used across all Carniceria components:
//! - `server` - REST API serving the catalog and auth endpoints
//! - `cart` - Client cart aggregation library
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, slugs, prices, emails,
//!   sale units, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
