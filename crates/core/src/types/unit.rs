//! Sale unit for products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The unit a product is sold in.
///
/// The unit determines the minimum quantity and step granularity a cart may
/// hold: weight-based cuts go down to half a kilo, count-based items are
/// whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "unit_type", rename_all = "lowercase")
)]
pub enum UnitType {
    /// Sold by weight in kilograms.
    #[default]
    Kg,
    /// Sold as a pre-packed bundle.
    Paquete,
    /// Sold by the piece.
    Pieza,
}

impl UnitType {
    /// Smallest quantity that can be ordered.
    #[must_use]
    pub fn min_quantity(&self) -> Decimal {
        match self {
            Self::Kg => Decimal::new(5, 1), // 0.5
            Self::Paquete | Self::Pieza => Decimal::ONE,
        }
    }

    /// Granularity of quantity adjustments.
    #[must_use]
    pub fn step(&self) -> Decimal {
        match self {
            Self::Kg => Decimal::new(5, 1), // 0.5
            Self::Paquete | Self::Pieza => Decimal::ONE,
        }
    }

    /// Clamp a requested quantity to this unit's minimum and snap it to the
    /// nearest step below.
    #[must_use]
    pub fn clamp_quantity(&self, quantity: Decimal) -> Decimal {
        let min = self.min_quantity();
        if quantity <= min {
            return min;
        }
        let step = self.step();
        let steps = (quantity / step).floor();
        (steps * step).max(min)
    }

    /// Display label shown next to quantities.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Kg => "Kg",
            Self::Paquete => "Paquete",
            Self::Pieza => "Pieza",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "paquete" => Ok(Self::Paquete),
            "pieza" => Ok(Self::Pieza),
            _ => Err(format!("invalid unit type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_minimums() {
        assert_eq!(UnitType::Kg.min_quantity(), d("0.5"));
        assert_eq!(UnitType::Paquete.min_quantity(), d("1"));
        assert_eq!(UnitType::Pieza.min_quantity(), d("1"));
    }

    #[test]
    fn test_clamp_below_minimum() {
        assert_eq!(UnitType::Kg.clamp_quantity(d("0.1")), d("0.5"));
        assert_eq!(UnitType::Pieza.clamp_quantity(d("0")), d("1"));
        assert_eq!(UnitType::Paquete.clamp_quantity(d("-3")), d("1"));
    }

    #[test]
    fn test_clamp_snaps_to_step() {
        assert_eq!(UnitType::Kg.clamp_quantity(d("1.7")), d("1.5"));
        assert_eq!(UnitType::Kg.clamp_quantity(d("2.0")), d("2.0"));
        assert_eq!(UnitType::Pieza.clamp_quantity(d("2.6")), d("2"));
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("Kg".parse::<UnitType>().unwrap(), UnitType::Kg);
        assert_eq!("PAQUETE".parse::<UnitType>().unwrap(), UnitType::Paquete);
        assert_eq!("pieza".parse::<UnitType>().unwrap(), UnitType::Pieza);
        assert!("caja".parse::<UnitType>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&UnitType::Kg).unwrap(), "\"Kg\"");
        let parsed: UnitType = serde_json::from_str("\"Paquete\"").unwrap();
        assert_eq!(parsed, UnitType::Paquete);
    }
}
