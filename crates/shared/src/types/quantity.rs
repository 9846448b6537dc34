//! Quantity type with decimal precision and site units.
//!
//! CRITICAL: Never use floating-point for quantity calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a material quantity with its unit of measure.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    /// The amount in the given unit.
    pub amount: Decimal,
    /// Unit of measure.
    pub unit: Unit,
}

/// Units of measure used on construction sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Piece / each.
    Un,
    /// Kilogram.
    Kg,
    /// Linear meter.
    M,
    /// Square meter.
    M2,
    /// Cubic meter.
    M3,
    /// Liter.
    L,
    /// Gallon.
    Gal,
    /// Bag (cement, mortar).
    Bag,
    /// Set / kit.
    Set,
}

impl Quantity {
    /// Creates a new quantity.
    #[must_use]
    pub const fn new(amount: Decimal, unit: Unit) -> Self {
        Self { amount, unit }
    }

    /// Creates a zero quantity in the specified unit.
    #[must_use]
    pub fn zero(unit: Unit) -> Self {
        Self {
            amount: Decimal::ZERO,
            unit,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Un => write!(f, "un"),
            Self::Kg => write!(f, "kg"),
            Self::M => write!(f, "m"),
            Self::M2 => write!(f, "m2"),
            Self::M3 => write!(f, "m3"),
            Self::L => write!(f, "l"),
            Self::Gal => write!(f, "gal"),
            Self::Bag => write!(f, "bag"),
            Self::Set => write!(f, "set"),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "un" | "und" | "pza" => Ok(Self::Un),
            "kg" => Ok(Self::Kg),
            "m" | "ml" => Ok(Self::M),
            "m2" => Ok(Self::M2),
            "m3" => Ok(Self::M3),
            "l" | "lt" => Ok(Self::L),
            "gal" | "gl" => Ok(Self::Gal),
            "bag" | "bls" => Ok(Self::Bag),
            "set" | "kit" => Ok(Self::Set),
            other => Err(format!("Unknown unit: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_quantity_creation() {
        let qty = Quantity::new(dec!(12.5), Unit::M3);
        assert_eq!(qty.amount, dec!(12.5));
        assert_eq!(qty.unit, Unit::M3);
    }

    #[test]
    fn test_quantity_zero() {
        let qty = Quantity::zero(Unit::Kg);
        assert!(qty.is_zero());
        assert!(!qty.is_negative());
    }

    #[test]
    fn test_quantity_negative() {
        let qty = Quantity::new(dec!(-1), Unit::Un);
        assert!(qty.is_negative());
    }

    #[test]
    fn test_unit_display_round_trip() {
        for unit in [
            Unit::Un,
            Unit::Kg,
            Unit::M,
            Unit::M2,
            Unit::M3,
            Unit::L,
            Unit::Gal,
            Unit::Bag,
            Unit::Set,
        ] {
            assert_eq!(Unit::from_str(&unit.to_string()).unwrap(), unit);
        }
    }

    // Legacy spreadsheet exports use Spanish abbreviations.
    #[rstest::rstest]
    #[case("und", Unit::Un)]
    #[case("pza", Unit::Un)]
    #[case("BLS", Unit::Bag)]
    #[case("gl", Unit::Gal)]
    #[case(" lt ", Unit::L)]
    #[case("ml", Unit::M)]
    fn test_unit_legacy_aliases(#[case] input: &str, #[case] expected: Unit) {
        assert_eq!(Unit::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(Unit::from_str("furlong").is_err());
        assert!(Unit::from_str("").is_err());
    }
}
