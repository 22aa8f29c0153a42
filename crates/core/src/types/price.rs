//! Type-safe price representation using decimal arithmetic.
//!
//! All money in Marigold Market is carried as a [`Price`]: a
//! `rust_decimal::Decimal` amount plus an ISO 4217 currency code. Cart
//! math stays in `Decimal` the whole way; floating point never touches a
//! total.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// This price scaled by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency,
        }
    }

    /// A price in the same currency with a different amount.
    #[must_use]
    pub const fn with_amount(&self, amount: Decimal) -> Self {
        Self {
            amount,
            currency: self.currency,
        }
    }

    /// The amount rounded to whole minor units (cents).
    ///
    /// Saturates at zero for negative amounts; prices in the catalog are
    /// never negative.
    #[must_use]
    pub fn cents(&self) -> u64 {
        (self.amount * Decimal::from(100u32))
            .round()
            .to_u64()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// The ISO 4217 code for this currency.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency code: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(amount: &str) -> Price {
        Price::new(amount.parse().unwrap(), CurrencyCode::USD)
    }

    #[test]
    fn test_display_pads_to_two_decimals() {
        assert_eq!(usd("19.99").to_string(), "$19.99");
        assert_eq!(usd("5").to_string(), "$5.00");
        assert_eq!(usd("0.5").to_string(), "$0.50");
    }

    #[test]
    fn test_display_non_dollar_symbols() {
        let price = Price::new("12.5".parse().unwrap(), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "\u{a3}12.50");
    }

    #[test]
    fn test_times_scales_amount() {
        let line = usd("4.25").times(3);
        assert_eq!(line, usd("12.75"));
    }

    #[test]
    fn test_times_zero_quantity() {
        assert_eq!(usd("9.99").times(0), usd("0"));
    }

    #[test]
    fn test_cents() {
        assert_eq!(usd("24.99").cents(), 2499);
        assert_eq!(usd("10").cents(), 1000);
        assert_eq!(usd("0.5").cents(), 50);
    }

    #[test]
    fn test_zero() {
        let zero = Price::zero(CurrencyCode::EUR);
        assert_eq!(zero.amount, Decimal::ZERO);
        assert_eq!(zero.currency, CurrencyCode::EUR);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("GBP".parse::<CurrencyCode>().unwrap(), CurrencyCode::GBP);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
