//! Domain types for the storefront engine.
//!
//! These are the validated in-memory shapes the stores operate on,
//! separate from any on-disk or display representation.

pub mod cart;
pub mod profile;
pub mod toast;

pub use cart::{CartItem, CartState, Order, ShippingMethod, ShippingMethodId};
pub use profile::{ProfileInput, UserProfile};
pub use toast::{Toast, ToastLevel};
