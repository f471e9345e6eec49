//! WhatsApp checkout handoff.
//!
//! Checkout is an external handoff: the cart is rendered into a plain-text
//! order message and wrapped in a `wa.me` deep link. No network call is made
//! from this system.

use crate::Cart;

/// Render the cart as the order message sent over WhatsApp.
///
/// One bullet per line item with quantity, unit, name, and line total,
/// followed by the cart total formatted to two decimals.
#[must_use]
pub fn order_message(cart: &Cart) -> String {
    let mut message = String::from("Hola! Quisiera hacer el siguiente pedido:\n");

    for line in cart.lines() {
        message.push_str(&format!(
            "- {} {} {} (${:.2})\n",
            line.quantity,
            line.unit_label,
            line.name,
            line.total()
        ));
    }

    message.push_str(&format!("Total: ${:.2}", cart.total()));
    message
}

/// Build the `wa.me` deep link that opens WhatsApp with the order message
/// pre-filled.
///
/// `phone` is the shop's number in international format without `+` or
/// spaces, e.g. `"5215512345678"`.
#[must_use]
pub fn whatsapp_link(phone: &str, cart: &Cart) -> String {
    let message = order_message(cart);
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(&message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CartItem;
    use carniceria_core::{Price, ProductId, Slug, UnitType};
    use rust_decimal::Decimal;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            &CartItem {
                product_id: ProductId::new(7),
                slug: Slug::parse("arrachera-marinada").unwrap(),
                name: "Arrachera Marinada".to_owned(),
                price: Price::parse("189.50").unwrap(),
                unit: UnitType::Kg,
                image_url: None,
            },
            d("1.5"),
        );
        cart
    }

    #[test]
    fn test_order_message_lists_lines_and_total() {
        let message = order_message(&sample_cart());
        assert!(message.contains("1.5 Kg Arrachera Marinada ($284.25)"));
        assert!(message.ends_with("Total: $284.25"));
    }

    #[test]
    fn test_whatsapp_link_is_percent_encoded() {
        let link = whatsapp_link("5215512345678", &sample_cart());
        assert!(link.starts_with("https://wa.me/5215512345678?text="));
        assert!(!link.contains(' '));
        assert!(link.contains("Arrachera%20Marinada"));
    }

    #[test]
    fn test_empty_cart_message_has_zero_total() {
        let message = order_message(&Cart::new());
        assert!(message.ends_with("Total: $0.00"));
    }
}
