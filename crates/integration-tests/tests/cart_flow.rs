//! Cart flows driven by catalog-shaped product data.
//!
//! These run without a server: the cart is client-side state, so the
//! whole add/adjust/checkout flow is exercised in-process.

use carniceria_cart::{Cart, CartItem, checkout};
use carniceria_core::{Price, ProductId, Slug, UnitType};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn arrachera() -> CartItem {
    CartItem {
        product_id: ProductId::new(1),
        slug: Slug::parse("arrachera-marinada").expect("slug"),
        name: "Arrachera Marinada".to_owned(),
        price: Price::new(d("189.50")).expect("price"),
        unit: UnitType::Kg,
        image_url: Some("/uploads/products/arrachera-1.jpg".to_owned()),
    }
}

fn jamon() -> CartItem {
    CartItem {
        product_id: ProductId::new(5),
        slug: Slug::parse("jamon-serrano").expect("slug"),
        name: "Jamon Serrano".to_owned(),
        price: Price::new(d("95.00")).expect("price"),
        unit: UnitType::Paquete,
        image_url: None,
    }
}

#[test]
fn test_full_cart_flow_to_order_message() {
    let mut cart = Cart::new();

    // Half a kilo twice merges into one line of a full kilo
    cart.add(&arrachera(), UnitType::Kg.min_quantity());
    cart.add(&arrachera(), UnitType::Kg.min_quantity());
    cart.add(&jamon(), d("2"));

    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.total(), d("379.50"));

    let message = checkout::order_message(&cart);
    assert!(message.contains("Arrachera Marinada"));
    assert!(message.contains("Jamon Serrano"));
    assert!(message.contains("Total: $379.50"));

    let link = checkout::whatsapp_link("5215511223344", &cart);
    assert!(link.starts_with("https://wa.me/5215511223344?text="));
    assert!(!link.contains(' '));
}

#[test]
fn test_cart_survives_storage_round_trip() {
    let mut cart = Cart::new();
    cart.add(&arrachera(), d("1.5"));
    cart.add(&jamon(), d("1"));

    let stored = cart.to_json().expect("serialize");
    let restored = Cart::from_json(&stored).expect("rehydrate");

    assert_eq!(restored.line_count(), cart.line_count());
    assert_eq!(restored.total(), cart.total());
}

#[test]
fn test_quantity_clamping_per_unit_type() {
    // Weight-based sales bottom out at half a kilo, count-based at one
    assert_eq!(UnitType::Kg.clamp_quantity(d("0.2")), d("0.5"));
    assert_eq!(UnitType::Paquete.clamp_quantity(d("0.2")), d("1"));
    assert_eq!(UnitType::Pieza.clamp_quantity(d("3")), d("3"));
}
