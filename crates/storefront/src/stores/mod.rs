//! State stores with change notification.
//!
//! Each store owns one slice of storefront state behind a
//! `tokio::sync::watch` channel: mutations go through the store's
//! methods, subscribers get the new state pushed to them, and
//! persistent slices are written through to local storage on every
//! change. Stores are cheap to clone and share.

pub mod cart;
pub mod prefs;
pub mod profile;
pub mod toast;

pub use cart::{CartError, CartStore};
pub use prefs::{DisplayMode, PrefsStore};
pub use profile::{ProfileError, ProfileStore};
pub use toast::ToastStore;
