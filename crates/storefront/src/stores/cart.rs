//! The shopping cart store.
//!
//! Holds the cart lines and the selected shipping method, enforces the
//! quantity invariant `1 <= quantity <= min(stock, 99)`, derives the
//! totals, and runs the mock checkout. Every mutation is written
//! through to local storage; subscribers see each new state via the
//! watch channel.
//!
//! Rejections (out of stock, over the cap, ...) are ordinary return
//! values whose `Display` strings are the exact messages a frontend
//! shows the user. Nothing here panics or retries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;

use marigold_core::{CurrencyCode, OrderNumber, Price, ProductId};

use crate::catalog::{Product, ProductCatalog};
use crate::models::cart::{CartItem, CartState, Order, ShippingMethodId};
use crate::storage::{StorageArea, keys};

/// User-facing cart operation rejections.
///
/// The `Display` output of each variant is the message shown to the
/// shopper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The product has no stock at all.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// The requested quantity exceeds the available stock.
    #[error("Only {stock} of {name} in stock")]
    InsufficientStock { name: String, stock: u32 },

    /// The requested quantity exceeds the per-line cap.
    #[error("Maximum quantity reached ({max} per item)")]
    MaxQuantity { max: u32 },

    /// The product has no line in the cart.
    #[error("That item is not in your cart")]
    NotInCart,

    /// Checkout was attempted with an empty cart.
    #[error("Your cart is empty")]
    EmptyCart,
}

/// The shopping cart store.
///
/// Cheaply cloneable; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    state: watch::Sender<CartState>,
    local: StorageArea,
    session: StorageArea,
    currency: CurrencyCode,
    checkout_delay: Duration,
}

impl CartStore {
    /// Build the store, hydrating from local storage.
    ///
    /// Persisted lines are re-validated against the catalog: lines for
    /// unknown or sold-out products are dropped, and surviving lines get
    /// fresh pricing and stock with their quantity re-clamped.
    pub(crate) fn hydrate(
        local: StorageArea,
        session: StorageArea,
        catalog: &ProductCatalog,
        currency: CurrencyCode,
        checkout_delay: Duration,
    ) -> Self {
        let mut state = match local.get::<CartState>(keys::CART) {
            Ok(Some(state)) => state,
            Ok(None) => CartState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted cart");
                CartState::default()
            }
        };

        let changed = revalidate(&mut state, catalog);

        let store = Self {
            inner: Arc::new(CartInner {
                state: watch::channel(state).0,
                local,
                session,
                currency,
                checkout_delay,
            }),
        };
        if changed {
            store.persist();
        }
        store
    }

    /// Subscribe to cart state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// The current cart state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Add one unit of a product, creating its line on first add.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Rejects when the product is sold out or the line already sits at
    /// its quantity cap; the cart is left unchanged.
    pub fn add_item(&self, product: &Product) -> Result<u32, CartError> {
        if product.stock == 0 {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        self.try_mutate(|state| {
            if let Some(item) = state
                .items
                .iter_mut()
                .find(|item| item.product_id == product.id)
            {
                if item.quantity >= item.quantity_cap() {
                    return Err(at_cap_error(item));
                }
                item.quantity += 1;
                Ok(item.quantity)
            } else {
                state.items.push(CartItem::for_product(product));
                Ok(1)
            }
        })
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// Returns the new quantity (0 when removed).
    ///
    /// # Errors
    ///
    /// Rejects quantities above the stock or the per-line cap; the
    /// prior quantity is left unchanged.
    pub fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<u32, CartError> {
        self.try_mutate(|state| {
            let Some(index) = state.items.iter().position(|item| item.product_id == id) else {
                return Err(CartError::NotInCart);
            };
            if quantity == 0 {
                state.items.remove(index);
                return Ok(0);
            }
            let Some(item) = state.items.get_mut(index) else {
                return Err(CartError::NotInCart);
            };
            if quantity > item.stock {
                return Err(CartError::InsufficientStock {
                    name: item.name.clone(),
                    stock: item.stock,
                });
            }
            if quantity > CartItem::MAX_QUANTITY {
                return Err(CartError::MaxQuantity {
                    max: CartItem::MAX_QUANTITY,
                });
            }
            item.quantity = quantity;
            Ok(quantity)
        })
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Rejects when the product has no line in the cart.
    pub fn remove_item(&self, id: ProductId) -> Result<(), CartError> {
        self.try_mutate(|state| {
            let Some(index) = state.items.iter().position(|item| item.product_id == id) else {
                return Err(CartError::NotInCart);
            };
            state.items.remove(index);
            Ok(0)
        })
        .map(|_| ())
    }

    /// Empty the cart, reset shipping to standard, and discard the last
    /// order ("continue shopping").
    pub fn clear(&self) {
        self.inner.state.send_modify(|state| {
            state.items.clear();
            state.shipping = ShippingMethodId::default();
        });
        if let Err(e) = self.inner.session.remove(keys::LAST_ORDER) {
            tracing::warn!(error = %e, "Failed to discard last order");
        }
        self.persist();
    }

    /// Select a shipping method, replacing the previous selection.
    pub fn select_shipping(&self, method: ShippingMethodId) {
        let modified = self.inner.state.send_if_modified(|state| {
            if state.shipping == method {
                false
            } else {
                state.shipping = method;
                true
            }
        });
        if modified {
            self.persist();
        }
    }

    /// The currently selected shipping method.
    #[must_use]
    pub fn shipping(&self) -> ShippingMethodId {
        self.inner.state.borrow().shipping
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.inner.state.borrow().total_items()
    }

    /// Sum of line totals, before shipping.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::new(self.inner.state.borrow().subtotal(), self.inner.currency)
    }

    /// Cost of the selected shipping method.
    #[must_use]
    pub fn shipping_cost(&self) -> Price {
        self.inner
            .state
            .borrow()
            .shipping
            .cost(self.inner.currency)
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn total(&self) -> Price {
        let state = self.inner.state.borrow();
        Price::new(
            state.subtotal() + state.shipping.cost(self.inner.currency).amount,
            self.inner.currency,
        )
    }

    /// The order from the most recent checkout, if any.
    #[must_use]
    pub fn last_order(&self) -> Option<Order> {
        match self.inner.session.get(keys::LAST_ORDER) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last order");
                None
            }
        }
    }

    /// Run the mock checkout: simulate network latency, then produce an
    /// order with a random six-digit number.
    ///
    /// The cart contents are *not* touched - the cart empties only on an
    /// explicit [`clear`](Self::clear).
    ///
    /// # Errors
    ///
    /// Rejects when the cart is empty.
    pub async fn checkout(&self) -> Result<Order, CartError> {
        let state = self.snapshot();
        if state.is_empty() {
            return Err(CartError::EmptyCart);
        }

        tokio::time::sleep(self.inner.checkout_delay).await;

        let number = OrderNumber::new(rand::rng().random_range(OrderNumber::MIN..OrderNumber::MAX));
        let placed_at = Utc::now();
        let order = Order {
            number,
            placed_at,
            item_count: state.total_items(),
            total: Price::new(
                state.subtotal() + state.shipping.cost(self.inner.currency).amount,
                self.inner.currency,
            ),
            shipping: state.shipping,
            estimated_delivery: state.shipping.estimated_arrival(placed_at),
        };

        if let Err(e) = self.inner.session.insert(keys::LAST_ORDER, &order) {
            tracing::warn!(error = %e, "Failed to stash last order");
        }
        tracing::info!(order = %order.number, total = %order.total, "Checkout complete");

        Ok(order)
    }

    /// Apply a fallible mutation; subscribers and storage only see
    /// states where the mutation succeeded.
    fn try_mutate(
        &self,
        f: impl FnOnce(&mut CartState) -> Result<u32, CartError>,
    ) -> Result<u32, CartError> {
        let mut outcome = Err(CartError::NotInCart);
        let modified = self.inner.state.send_if_modified(|state| {
            outcome = f(state);
            outcome.is_ok()
        });
        if modified {
            self.persist();
        }
        outcome
    }

    fn persist(&self) {
        let state = self.inner.state.borrow().clone();
        if let Err(e) = self.inner.local.insert(keys::CART, &state) {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// The rejection for a line already at its quantity cap.
fn at_cap_error(item: &CartItem) -> CartError {
    if item.stock <= CartItem::MAX_QUANTITY {
        CartError::InsufficientStock {
            name: item.name.clone(),
            stock: item.stock,
        }
    } else {
        CartError::MaxQuantity {
            max: CartItem::MAX_QUANTITY,
        }
    }
}

/// Re-validate persisted lines against the current catalog.
///
/// Returns whether anything changed.
fn revalidate(state: &mut CartState, catalog: &ProductCatalog) -> bool {
    let mut changed = false;
    state.items.retain_mut(|item| match catalog.get(item.product_id) {
        Some(product) if product.stock > 0 => {
            let refreshed = CartItem {
                quantity: item.quantity.clamp(1, product.stock.min(CartItem::MAX_QUANTITY)),
                ..CartItem::for_product(product)
            };
            if *item != refreshed {
                *item = refreshed;
                changed = true;
            }
            true
        }
        _ => {
            changed = true;
            false
        }
    });
    changed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marigold_core::CurrencyCode;
    use rust_decimal::Decimal;

    fn product(id: i32, price: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: String::new(),
            category: "test".to_string(),
            price: Price::new(price.parse().unwrap(), CurrencyCode::USD),
            sale_price: None,
            on_sale: false,
            stock,
            image: String::new(),
            tags: Vec::new(),
        }
    }

    fn sale_product(id: i32, price: &str, sale: &str, stock: u32) -> Product {
        let mut p = product(id, price, stock);
        p.sale_price = Some(Price::new(sale.parse().unwrap(), CurrencyCode::USD));
        p.on_sale = true;
        p
    }

    fn empty_store() -> CartStore {
        let catalog = ProductCatalog::from_products(Vec::new(), CurrencyCode::USD).unwrap();
        CartStore::hydrate(
            StorageArea::ephemeral(),
            StorageArea::ephemeral(),
            &catalog,
            CurrencyCode::USD,
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let store = empty_store();
        store.add_item(&product(1, "5.00", 10)).unwrap();
        let before = store.snapshot();

        store.add_item(&product(2, "3.00", 10)).unwrap();
        store.remove_item(ProductId::new(2)).unwrap();

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_add_increments_existing_line() {
        let store = empty_store();
        let p = product(1, "5.00", 10);
        assert_eq!(store.add_item(&p).unwrap(), 1);
        assert_eq!(store.add_item(&p).unwrap(), 2);
        assert_eq!(store.total_items(), 2);
        assert_eq!(store.snapshot().items.len(), 1);
    }

    #[test]
    fn test_add_out_of_stock_rejected() {
        let store = empty_store();
        let err = store.add_item(&product(1, "5.00", 0)).unwrap_err();
        assert_eq!(
            err,
            CartError::OutOfStock {
                name: "product-1".to_string()
            }
        );
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_add_stops_at_stock_cap() {
        let store = empty_store();
        let p = product(1, "5.00", 2);
        store.add_item(&p).unwrap();
        store.add_item(&p).unwrap();

        let err = store.add_item(&p).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                name: "product-1".to_string(),
                stock: 2
            }
        );
        assert_eq!(err.to_string(), "Only 2 of product-1 in stock");
        assert_eq!(store.total_items(), 2);
    }

    #[test]
    fn test_update_quantity_above_stock_leaves_prior_quantity() {
        let store = empty_store();
        store.add_item(&product(1, "5.00", 4)).unwrap();
        store.update_quantity(ProductId::new(1), 3).unwrap();

        let err = store.update_quantity(ProductId::new(1), 5).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { stock: 4, .. }));
        assert_eq!(store.snapshot().find(ProductId::new(1)).unwrap().quantity, 3);
    }

    #[test]
    fn test_update_quantity_above_hard_cap() {
        let store = empty_store();
        store.add_item(&product(1, "5.00", 500)).unwrap();

        let err = store.update_quantity(ProductId::new(1), 100).unwrap_err();
        assert_eq!(err, CartError::MaxQuantity { max: 99 });
        assert_eq!(store.update_quantity(ProductId::new(1), 99).unwrap(), 99);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let store = empty_store();
        store.add_item(&product(1, "5.00", 10)).unwrap();
        assert_eq!(store.update_quantity(ProductId::new(1), 0).unwrap(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_update_unknown_product() {
        let store = empty_store();
        assert_eq!(
            store.update_quantity(ProductId::new(9), 1).unwrap_err(),
            CartError::NotInCart
        );
    }

    #[test]
    fn test_subtotal_uses_effective_prices() {
        let store = empty_store();
        let regular = product(1, "10.00", 10);
        let on_sale = sale_product(2, "40.00", "25.00", 10);

        store.add_item(&regular).unwrap();
        store.add_item(&regular).unwrap();
        store.add_item(&on_sale).unwrap();

        // 2 x 10.00 + 1 x 25.00
        assert_eq!(store.subtotal().amount, Decimal::new(4500, 2));
    }

    #[test]
    fn test_exactly_one_shipping_method_selected() {
        let store = empty_store();
        assert_eq!(store.shipping(), ShippingMethodId::Standard);

        store.select_shipping(ShippingMethodId::Express);
        assert_eq!(store.shipping(), ShippingMethodId::Express);

        store.select_shipping(ShippingMethodId::Overnight);
        assert_eq!(store.shipping(), ShippingMethodId::Overnight);
    }

    #[test]
    fn test_total_is_subtotal_plus_shipping() {
        let store = empty_store();
        store.add_item(&product(1, "10.00", 10)).unwrap();
        store.select_shipping(ShippingMethodId::Express);

        assert_eq!(store.subtotal().to_string(), "$10.00");
        assert_eq!(store.shipping_cost().to_string(), "$9.99");
        assert_eq!(store.total().to_string(), "$19.99");
    }

    #[test]
    fn test_clear_resets_everything() {
        let store = empty_store();
        store.add_item(&product(1, "10.00", 10)).unwrap();
        store.select_shipping(ShippingMethodId::Overnight);

        store.clear();

        assert!(store.snapshot().is_empty());
        assert_eq!(store.shipping(), ShippingMethodId::Standard);
        assert!(store.last_order().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_empty_cart_rejected() {
        let store = empty_store();
        assert_eq!(store.checkout().await.unwrap_err(), CartError::EmptyCart);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_produces_order_without_mutating_cart() {
        let store = empty_store();
        store.add_item(&product(1, "10.00", 10)).unwrap();
        store.add_item(&product(1, "10.00", 10)).unwrap();
        let before = store.snapshot();

        let order = store.checkout().await.unwrap();

        assert!((OrderNumber::MIN..OrderNumber::MAX).contains(&order.number.as_u32()));
        assert_eq!(order.item_count, 2);
        assert_eq!(order.total.to_string(), "$24.99"); // 20.00 + 4.99 standard
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.last_order(), Some(order));
    }

    #[test]
    fn test_hydrate_reclamps_against_catalog() {
        let local = StorageArea::ephemeral();
        let stale = CartState {
            items: vec![
                // Quantity above current stock: clamped to 3.
                CartItem {
                    quantity: 8,
                    ..CartItem::for_product(&product(1, "5.00", 20))
                },
                // Product no longer in the catalog: dropped.
                CartItem::for_product(&product(2, "7.00", 5)),
                // Product now sold out: dropped.
                CartItem::for_product(&product(3, "9.00", 5)),
            ],
            shipping: ShippingMethodId::Express,
        };
        local.insert(keys::CART, &stale).unwrap();

        let catalog = ProductCatalog::from_products(
            vec![product(1, "5.00", 3), product(3, "9.00", 0)],
            CurrencyCode::USD,
        )
        .unwrap();

        let store = CartStore::hydrate(
            local,
            StorageArea::ephemeral(),
            &catalog,
            CurrencyCode::USD,
            Duration::from_millis(10),
        );

        let state = store.snapshot();
        assert_eq!(state.items.len(), 1);
        let line = state.find(ProductId::new(1)).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.stock, 3);
        // The selection survives hydration.
        assert_eq!(state.shipping, ShippingMethodId::Express);
    }

    #[test]
    fn test_mutations_persist_to_storage() {
        let local = StorageArea::ephemeral();
        let catalog = ProductCatalog::from_products(Vec::new(), CurrencyCode::USD).unwrap();
        let store = CartStore::hydrate(
            local.clone(),
            StorageArea::ephemeral(),
            &catalog,
            CurrencyCode::USD,
            Duration::from_millis(10),
        );

        store.add_item(&product(1, "5.00", 10)).unwrap();

        let persisted: CartState = local.get(keys::CART).unwrap().unwrap();
        assert_eq!(persisted, store.snapshot());
    }

    #[test]
    fn test_rejected_mutation_does_not_notify_subscribers() {
        let store = empty_store();
        store.add_item(&product(1, "5.00", 2)).unwrap();

        let rx = store.subscribe();
        let _ = store.update_quantity(ProductId::new(1), 50).unwrap_err();
        assert!(!rx.has_changed().unwrap());
    }
}
