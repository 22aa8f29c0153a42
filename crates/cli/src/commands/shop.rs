//! A scripted shopping session.
//!
//! Drives the whole engine end to end: search, cart mutations (including
//! a rejected one), shipping selection, totals, mock checkout, and the
//! toast queue. Useful as a smoke test and as living documentation of
//! the store APIs.

use tracing::{info, warn};

use marigold_storefront::config::StorefrontConfig;
use marigold_storefront::models::ShippingMethodId;
use marigold_storefront::models::toast::ToastLevel;
use marigold_storefront::state::Storefront;

/// Run the scripted session against the configured catalog.
///
/// # Errors
///
/// Returns an error if the storefront cannot be opened or the catalog
/// has no sellable products.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let storefront = Storefront::open(config)?;
    storefront.build_search_index()?;

    // -- Search-as-you-type ---------------------------------------------------
    let mut results_rx = storefront.search().subscribe();
    storefront.search().set_query("mug");
    storefront.search().flush_query();
    results_rx.changed().await?;
    let results = results_rx.borrow_and_update().clone();
    info!(hits = results.hits.len(), query = %results.query, "Searched the catalog");

    // -- Fill the cart --------------------------------------------------------
    let cart = storefront.cart();
    let toasts = storefront.toasts();

    let mut sellable = storefront
        .catalog()
        .all()
        .iter()
        .filter(|product| product.is_available());
    let first = sellable
        .next()
        .ok_or("catalog has no sellable products")?;
    let second = sellable.next().unwrap_or(first);

    for product in [first, second, second] {
        match cart.add_item(product) {
            Ok(quantity) => {
                toasts.push(
                    ToastLevel::Success,
                    format!("Added {} (x{quantity})", product.name),
                );
            }
            Err(e) => {
                toasts.push(ToastLevel::Error, e.to_string());
            }
        }
    }

    // Ask for more than the shelf holds; the rejection becomes a toast.
    if let Err(e) = cart.update_quantity(first.id, first.stock + 1) {
        toasts.push(ToastLevel::Error, e.to_string());
    }

    // -- Shipping and totals --------------------------------------------------
    cart.select_shipping(ShippingMethodId::Express);
    info!(
        items = cart.total_items(),
        subtotal = %cart.subtotal(),
        shipping = %cart.shipping_cost(),
        total = %cart.total(),
        method = %cart.shipping(),
        "Cart ready"
    );

    // -- Checkout -------------------------------------------------------------
    let order = cart.checkout().await?;
    info!(
        order = %order.number,
        total = %order.total,
        estimated_delivery = %order.estimated_delivery,
        "Order placed"
    );

    // The cart is untouched until the shopper moves on.
    info!(items = cart.total_items(), "Cart after checkout");
    cart.clear();
    info!(items = cart.total_items(), "Cart after continue shopping");

    // -- Surface the toast trail ---------------------------------------------
    for toast in toasts.toasts() {
        match toast.level {
            ToastLevel::Error => warn!("toast: {}", toast.message),
            _ => info!("toast: {}", toast.message),
        }
    }

    Ok(())
}
