//! Marigold Core - Shared types library.
//!
//! This crate provides common types used across all Marigold Market
//! components:
//! - `storefront` - The storefront engine library
//! - `cli` - Command-line tools for seeding and store management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   stock levels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
