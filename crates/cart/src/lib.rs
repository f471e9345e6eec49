//! Cart aggregation for the Carniceria storefront.
//!
//! The cart is an explicit store object owned by whoever drives the UI; it is
//! never global state. Line items are keyed by `(product id, unit variant)`:
//! adding the same pair again merges into the existing line instead of
//! appending a duplicate.
//!
//! Persistence is snapshot-based: [`Cart::to_json`] serializes a versioned
//! [`CartSnapshot`], and [`Cart::from_json`] rehydrates it, migrating the
//! legacy versionless array shape (numbers stored as strings included) that
//! earlier storefront builds wrote to local storage.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;

pub use checkout::{order_message, whatsapp_link};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use carniceria_core::{Price, ProductId, Slug, UnitType};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur when rehydrating a persisted cart.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// The payload is not valid JSON or not a known cart shape.
    #[error("unreadable cart payload: {0}")]
    Unreadable(String),
    /// The payload declares a snapshot version this build does not know.
    #[error("unsupported cart snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Catalog data needed to open a cart line.
///
/// This is what the product page hands to [`Cart::add`]; the cart copies the
/// fields it needs for display so it stays renderable even if the catalog
/// entry changes afterwards.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: ProductId,
    pub slug: Slug,
    pub name: String,
    pub price: Price,
    pub unit: UnitType,
    pub image_url: Option<String>,
}

/// One entry in the cart: a distinct product+variant selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Composite key: `<product id>:<unit label>`.
    pub line_id: String,
    pub product_id: ProductId,
    pub slug: Slug,
    pub name: String,
    pub price: Price,
    pub unit_label: String,
    pub image_url: Option<String>,
    pub quantity: Decimal,
}

impl LineItem {
    /// Line total: price × quantity, computed fresh.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Versioned serialization schema for persisted carts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub version: u32,
    pub lines: Vec<LineItem>,
}

/// The cart aggregator.
///
/// Invariant: at most one line item per distinct `(product id, unit variant)`
/// pair; insertion order of lines is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The composite line key for a product and unit variant.
    #[must_use]
    pub fn line_id(product_id: ProductId, unit: UnitType) -> String {
        format!("{}:{}", product_id, unit.label())
    }

    /// Add a quantity of an item to the cart.
    ///
    /// If a line with the same `(product id, unit variant)` key exists, the
    /// quantity is added to it; otherwise a new line is appended. Returns the
    /// line id of the affected line.
    ///
    /// Callers are expected to pass quantities already clamped via
    /// [`UnitType::clamp_quantity`]; this layer only merges.
    pub fn add(&mut self, item: &CartItem, quantity: Decimal) -> String {
        let line_id = Self::line_id(item.product_id, item.unit);

        if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == line_id) {
            line.quantity += quantity;
        } else {
            self.lines.push(LineItem {
                line_id: line_id.clone(),
                product_id: item.product_id,
                slug: item.slug.clone(),
                name: item.name.clone(),
                price: item.price,
                unit_label: item.unit.label().to_owned(),
                image_url: item.image_url.clone(),
                quantity,
            });
        }

        line_id
    }

    /// Remove a line item. No-op if the id does not match any line.
    pub fn remove(&mut self, line_id: &str) {
        self.lines.retain(|l| l.line_id != line_id);
    }

    /// Replace the quantity of a line item.
    ///
    /// No lower bound is enforced here; callers clamp to the unit's minimum
    /// with [`UnitType::clamp_quantity`] first. Returns `false` when no line
    /// matches.
    pub fn set_quantity(&mut self, line_id: &str, quantity: Decimal) -> bool {
        match self.lines.iter_mut().find(|l| l.line_id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Number of distinct line items (not the sum of quantities).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Monetary total: `Σ price × quantity` over current lines, recomputed on
    /// every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(LineItem::total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The current line items, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Snapshot the cart for persistence.
    #[must_use]
    pub fn to_snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            version: SNAPSHOT_VERSION,
            lines: self.lines.clone(),
        }
    }

    /// Rebuild a cart from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnsupportedVersion`] for versions newer than this
    /// build understands.
    pub fn from_snapshot(snapshot: CartSnapshot) -> Result<Self, CartError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CartError::UnsupportedVersion(snapshot.version));
        }
        Ok(Self {
            lines: snapshot.lines,
        })
    }

    /// Serialize the cart to the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unreadable`] if serialization fails, which only
    /// happens for non-finite decimals and is not reachable from this API.
    pub fn to_json(&self) -> Result<String, CartError> {
        serde_json::to_string(&self.to_snapshot()).map_err(|e| CartError::Unreadable(e.to_string()))
    }

    /// Rehydrate a cart from persisted JSON.
    ///
    /// Accepts the current versioned snapshot and migrates the legacy shape:
    /// a bare array of line objects with camelCase keys and numbers that may
    /// have round-tripped through storage as strings.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unreadable`] when the payload is neither shape,
    /// or [`CartError::UnsupportedVersion`] for future snapshot versions.
    pub fn from_json(payload: &str) -> Result<Self, CartError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| CartError::Unreadable(e.to_string()))?;

        if value.is_array() {
            return migrate::legacy_lines(&value).map(|lines| Self { lines });
        }

        let snapshot: CartSnapshot =
            serde_json::from_value(value).map_err(|e| CartError::Unreadable(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}

/// Migration of the legacy versionless local-storage shape.
mod migrate {
    use super::{CartError, LineItem};
    use carniceria_core::{Price, ProductId, Slug};
    use rust_decimal::Decimal;
    use serde_json::Value;

    /// Parse the legacy array-of-objects shape.
    ///
    /// Legacy keys are camelCase (`lineItemId`, `productId`, `unitLabel`,
    /// `imageURL`) and `price`/`quantity` may be JSON numbers or strings.
    pub(super) fn legacy_lines(value: &Value) -> Result<Vec<LineItem>, CartError> {
        let entries = value
            .as_array()
            .ok_or_else(|| CartError::Unreadable("expected array".to_owned()))?;

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            let product_id = entry
                .get("productId")
                .and_then(Value::as_i64)
                .and_then(|id| i32::try_from(id).ok())
                .ok_or_else(|| CartError::Unreadable("missing productId".to_owned()))?;
            let slug = str_field(entry, "slug")?;
            let slug = Slug::parse(&slug)
                .map_err(|e| CartError::Unreadable(format!("bad slug in stored cart: {e}")))?;
            let name = str_field(entry, "name")?;
            let unit_label = str_field(entry, "unitLabel")?;
            let price = Price::new(decimal_field(entry, "price")?)
                .map_err(|e| CartError::Unreadable(format!("bad price in stored cart: {e}")))?;
            let quantity = decimal_field(entry, "quantity")?;
            let image_url = entry
                .get("imageURL")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let line_id = entry
                .get("lineItemId")
                .and_then(Value::as_str)
                .map_or_else(|| format!("{product_id}:{unit_label}"), str::to_owned);

            lines.push(LineItem {
                line_id,
                product_id: ProductId::new(product_id),
                slug,
                name,
                price,
                unit_label,
                image_url,
                quantity,
            });
        }

        Ok(lines)
    }

    fn str_field(entry: &Value, key: &str) -> Result<String, CartError> {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| CartError::Unreadable(format!("missing {key}")))
    }

    /// Numeric coercion: accept a JSON number or a numeric string.
    fn decimal_field(entry: &Value, key: &str) -> Result<Decimal, CartError> {
        let value = entry
            .get(key)
            .ok_or_else(|| CartError::Unreadable(format!("missing {key}")))?;

        let parsed = match value {
            Value::String(s) => s.parse::<Decimal>().ok(),
            Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| CartError::Unreadable(format!("{key} is not numeric")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn arrachera() -> CartItem {
        CartItem {
            product_id: ProductId::new(7),
            slug: Slug::parse("arrachera-marinada").unwrap(),
            name: "Arrachera Marinada".to_owned(),
            price: Price::parse("189.50").unwrap(),
            unit: UnitType::Kg,
            image_url: Some("/uploads/products/arrachera-1700000000.jpg".to_owned()),
        }
    }

    fn chorizo() -> CartItem {
        CartItem {
            product_id: ProductId::new(12),
            slug: Slug::parse("chorizo-argentino").unwrap(),
            name: "Chorizo Argentino".to_owned(),
            price: Price::parse("95").unwrap(),
            unit: UnitType::Paquete,
            image_url: None,
        }
    }

    #[test]
    fn test_add_merges_same_product_and_variant() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("0.5"));
        cart.add(&arrachera(), d("1.0"));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, d("1.5"));
    }

    #[test]
    fn test_add_keeps_distinct_products_separate() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("1"));
        cart.add(&chorizo(), d("2"));

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_line_count_is_distinct_lines_not_quantity_sum() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("3"));
        cart.add(&chorizo(), d("4"));

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_total_recomputes_after_mutation() {
        let mut cart = Cart::new();
        let line = cart.add(&arrachera(), d("1"));
        cart.add(&chorizo(), d("2"));
        assert_eq!(cart.total(), d("379.50")); // 189.50 + 190

        cart.set_quantity(&line, d("0.5"));
        assert_eq!(cart.total(), d("284.750")); // 94.75 + 190

        cart.remove(&line);
        assert_eq!(cart.total(), d("190"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("1"));
        cart.remove("999:Kg");
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_set_quantity_missing_returns_false() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity("7:Kg", d("2")));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("1.5"));
        cart.add(&chorizo(), d("1"));

        let json = cart.to_json().unwrap();
        let restored = Cart::from_json(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.total(), cart.total());
    }

    #[test]
    fn test_future_snapshot_version_rejected() {
        let payload = r#"{"version":99,"lines":[]}"#;
        assert!(matches!(
            Cart::from_json(payload),
            Err(CartError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_legacy_payload_migrates() {
        // Old builds stored a bare array with camelCase keys; price and
        // quantity could come back from storage as strings.
        let payload = r#"[
            {
                "lineItemId": "7:Kg",
                "productId": 7,
                "slug": "arrachera-marinada",
                "name": "Arrachera Marinada",
                "price": "189.50",
                "unitLabel": "Kg",
                "imageURL": "/uploads/products/arrachera.jpg",
                "quantity": "1.5"
            },
            {
                "lineItemId": "12:Paquete",
                "productId": 12,
                "slug": "chorizo-argentino",
                "name": "Chorizo Argentino",
                "price": 95,
                "unitLabel": "Paquete",
                "quantity": 2
            }
        ]"#;

        let cart = Cart::from_json(payload).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total(), d("474.25")); // 284.25 + 190
        assert_eq!(cart.lines()[0].line_id, "7:Kg");
    }

    #[test]
    fn test_legacy_garbage_is_unreadable() {
        assert!(matches!(
            Cart::from_json(r#"[{"productId":"not-a-number"}]"#),
            Err(CartError::Unreadable(_))
        ));
        assert!(matches!(
            Cart::from_json("not json"),
            Err(CartError::Unreadable(_))
        ));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&arrachera(), d("1"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
