//! Marigold Storefront - the storefront state engine.
//!
//! This crate is the headless heart of Marigold Market: the product
//! catalog, full-text search with search-as-you-type debouncing, the
//! shopping cart with shipping selection and mock checkout, the user
//! profile, display preferences, and the toast queue.
//!
//! Every piece of mutable state lives in a store object ([`stores`],
//! [`search::SearchStore`]) that publishes changes through a
//! `tokio::sync::watch` channel, so any number of frontends can
//! subscribe without the engine knowing about them. The composition
//! root is [`state::Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod state;
pub mod storage;
pub mod stores;
