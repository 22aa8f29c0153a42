//! Cart domain types: line items, shipping methods, orders.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{CurrencyCode, OrderNumber, Price, ProductId};

use crate::catalog::Product;

/// A line in the shopping cart.
///
/// Carries a snapshot of the product's pricing and stock at the time it
/// was added; hydration refreshes the snapshot from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub on_sale: bool,
    pub quantity: u32,
    pub stock: u32,
    pub image: String,
}

impl CartItem {
    /// Hard per-line quantity cap, independent of stock.
    pub const MAX_QUANTITY: u32 = 99;

    /// Create a line for one unit of a product.
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            sale_price: product.sale_price,
            on_sale: product.on_sale,
            quantity: 1,
            stock: product.stock,
            image: product.image.clone(),
        }
    }

    /// The price one unit sells for (sale price when on sale).
    #[must_use]
    pub fn unit_price(&self) -> Price {
        match (self.on_sale, self.sale_price) {
            (true, Some(sale)) => sale,
            _ => self.price,
        }
    }

    /// The line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }

    /// The largest quantity this line may hold: `min(stock, 99)`.
    #[must_use]
    pub fn quantity_cap(&self) -> u32 {
        self.stock.min(Self::MAX_QUANTITY)
    }
}

/// The selectable shipping methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethodId {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl ShippingMethodId {
    /// Every method, in display order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    /// The static rate card entry for this method.
    #[must_use]
    pub fn method(self) -> ShippingMethod {
        match self {
            Self::Standard => ShippingMethod {
                id: self,
                name: "Standard Shipping",
                cost: Decimal::new(499, 2),
                window_days: (5, 7),
            },
            Self::Express => ShippingMethod {
                id: self,
                name: "Express Shipping",
                cost: Decimal::new(999, 2),
                window_days: (2, 3),
            },
            Self::Overnight => ShippingMethod {
                id: self,
                name: "Overnight Shipping",
                cost: Decimal::new(1999, 2),
                window_days: (1, 1),
            },
        }
    }

    /// Shipping cost in the storefront currency.
    #[must_use]
    pub fn cost(self, currency: CurrencyCode) -> Price {
        Price::new(self.method().cost, currency)
    }

    /// Human-readable delivery window, e.g. "5-7 business days".
    #[must_use]
    pub fn delivery_estimate(self) -> String {
        let (min, max) = self.method().window_days;
        if min == max {
            format!("{min} business day")
        } else {
            format!("{min}-{max} business days")
        }
    }

    /// The latest expected arrival date for an order placed at `from`.
    #[must_use]
    pub fn estimated_arrival(self, from: DateTime<Utc>) -> NaiveDate {
        let (_, max) = self.method().window_days;
        (from + chrono::Duration::days(i64::from(max))).date_naive()
    }
}

impl std::fmt::Display for ShippingMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
            Self::Overnight => write!(f, "overnight"),
        }
    }
}

impl std::str::FromStr for ShippingMethodId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

/// A shipping rate card entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: &'static str,
    pub cost: Decimal,
    /// Delivery window as (min, max) business days.
    pub window_days: (u32, u32),
}

/// A placed order.
///
/// Ephemeral by design: orders are produced by the mock checkout, kept
/// in session storage, and discarded when the cart is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub number: OrderNumber,
    pub placed_at: DateTime<Utc>,
    pub item_count: u32,
    pub total: Price,
    pub shipping: ShippingMethodId,
    pub estimated_delivery: NaiveDate,
}

/// The full cart state published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CartState {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,
    /// The selected shipping method. Exactly one is always selected.
    pub shipping: ShippingMethodId,
}

impl CartState {
    /// Sum of line totals, before shipping.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.line_total().amount)
            .sum()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by product ID.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == id)
    }
}
