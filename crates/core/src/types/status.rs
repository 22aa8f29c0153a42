//! Stock level classification.

use serde::{Deserialize, Serialize};

/// How much of a product is left, bucketed for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// Plenty on hand.
    InStock,
    /// At or below the low-stock threshold, but available.
    LowStock,
    /// Nothing left to sell.
    OutOfStock,
}

impl StockLevel {
    /// Remaining units at or below this count read as "low stock".
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    /// Classify a remaining stock count.
    #[must_use]
    pub const fn for_quantity(stock: u32) -> Self {
        match stock {
            0 => Self::OutOfStock,
            1..=Self::LOW_STOCK_THRESHOLD => Self::LowStock,
            _ => Self::InStock,
        }
    }

    /// Whether any units can still be sold.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::OutOfStock)
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in_stock"),
            Self::LowStock => write!(f, "low_stock"),
            Self::OutOfStock => write!(f, "out_of_stock"),
        }
    }
}

impl std::str::FromStr for StockLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "low_stock" => Ok(Self::LowStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock level: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_quantity_buckets() {
        assert_eq!(StockLevel::for_quantity(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::for_quantity(1), StockLevel::LowStock);
        assert_eq!(StockLevel::for_quantity(5), StockLevel::LowStock);
        assert_eq!(StockLevel::for_quantity(6), StockLevel::InStock);
        assert_eq!(StockLevel::for_quantity(500), StockLevel::InStock);
    }

    #[test]
    fn test_is_available() {
        assert!(StockLevel::InStock.is_available());
        assert!(StockLevel::LowStock.is_available());
        assert!(!StockLevel::OutOfStock.is_available());
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for level in [
            StockLevel::InStock,
            StockLevel::LowStock,
            StockLevel::OutOfStock,
        ] {
            let parsed: StockLevel = level.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, level);
        }
    }
}
