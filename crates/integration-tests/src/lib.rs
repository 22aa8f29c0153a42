//! Integration tests for Marigold Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marigold-integration-tests
//! ```
//!
//! The tests exercise the storefront engine through its public API
//! only: open a storefront against a temp data directory, drive the
//! stores the way a frontend would, and assert on what subscribers see
//! and what lands on disk.

#![cfg_attr(not(test), forbid(unsafe_code))]

use marigold_storefront::catalog::ProductCatalog;
use marigold_storefront::config::StorefrontConfig;
use marigold_storefront::state::Storefront;

/// The catalog the flow tests run against.
pub const TEST_CATALOG: &str = r#"currency: USD
products:
  - id: 1
    name: Stoneware Mug
    description: A heavy hand-thrown mug that keeps coffee warm.
    category: kitchen
    price: "18.00"
    stock: 12
    image: /images/stoneware-mug.jpg
    tags: [ceramic, coffee]
  - id: 2
    name: Linen Apron
    description: Washed linen apron with a deep front pocket.
    category: kitchen
    price: "42.00"
    sale_price: "29.00"
    on_sale: true
    stock: 4
    image: /images/linen-apron.jpg
    tags: [linen, cooking]
  - id: 3
    name: Beeswax Candle
    description: Slow-burning candle with a faint honey scent.
    category: home
    price: "12.50"
    stock: 40
    image: /images/beeswax-candle.jpg
    tags: [candle, gift]
  - id: 4
    name: Garden Twine Spool
    description: Jute twine on a refillable beechwood spool.
    category: garden
    price: "9.75"
    stock: 0
    image: /images/garden-twine.jpg
    tags: [jute, tools]
"#;

/// A config pointing at a unique temp data directory.
#[must_use]
pub fn temp_config() -> StorefrontConfig {
    let data_dir = std::env::temp_dir().join(format!("marigold-it-{}", uuid::Uuid::new_v4()));
    StorefrontConfig {
        catalog_file: data_dir.join("catalog.yaml"),
        data_dir,
        ..Default::default()
    }
}

/// Write the test catalog into the config's catalog path.
///
/// # Panics
///
/// Panics if the data directory cannot be created or written.
pub fn write_test_catalog(config: &StorefrontConfig) {
    std::fs::create_dir_all(&config.data_dir).expect("create data dir");
    std::fs::write(&config.catalog_file, TEST_CATALOG).expect("write catalog");
}

/// Open a storefront on a fresh temp dir with the test catalog, ready
/// for searching.
///
/// # Panics
///
/// Panics if the storefront cannot be opened.
#[must_use]
pub fn open_storefront() -> (Storefront, StorefrontConfig) {
    let config = temp_config();
    write_test_catalog(&config);
    let storefront = Storefront::open(config.clone()).expect("open storefront");
    (storefront, config)
}

/// Parse the test catalog without touching disk.
///
/// # Panics
///
/// Panics if the embedded catalog is invalid.
#[must_use]
pub fn test_catalog() -> ProductCatalog {
    ProductCatalog::from_yaml_str(TEST_CATALOG).expect("valid test catalog")
}

/// Remove a temp data directory, ignoring failures.
pub fn cleanup(config: &StorefrontConfig) {
    let _ = std::fs::remove_dir_all(&config.data_dir);
}
