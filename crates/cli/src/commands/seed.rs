//! Seed the data directory with a starter catalog.
//!
//! The starter catalog is validated through the real catalog loader
//! before anything touches disk, so a seeded storefront always opens.

use tracing::info;

use marigold_storefront::catalog::ProductCatalog;
use marigold_storefront::config::StorefrontConfig;

/// The catalog a fresh storefront starts with.
const STARTER_CATALOG: &str = r#"currency: USD
products:
  - id: 1
    name: Stoneware Mug
    description: A heavy hand-thrown mug that keeps coffee warm on slow mornings.
    category: kitchen
    price: "18.00"
    stock: 24
    image: /images/stoneware-mug.jpg
    tags: [ceramic, coffee, handmade]
  - id: 2
    name: Linen Apron
    description: Washed linen apron with a deep front pocket and long ties.
    category: kitchen
    price: "42.00"
    sale_price: "29.00"
    on_sale: true
    stock: 9
    image: /images/linen-apron.jpg
    tags: [linen, cooking]
  - id: 3
    name: Walnut Serving Board
    description: End-grain walnut board, food-safe oil finish.
    category: kitchen
    price: "56.00"
    stock: 7
    image: /images/walnut-board.jpg
    tags: [wood, serving]
  - id: 4
    name: Beeswax Candle
    description: Slow-burning candle with a faint honey scent.
    category: home
    price: "12.50"
    stock: 40
    image: /images/beeswax-candle.jpg
    tags: [candle, gift]
  - id: 5
    name: Wool Throw Blanket
    description: Lambswool throw in a herringbone weave.
    category: home
    price: "88.00"
    sale_price: "64.00"
    on_sale: true
    stock: 3
    image: /images/wool-throw.jpg
    tags: [wool, cozy]
  - id: 6
    name: Marigold Seed Packet
    description: Open-pollinated marigold seeds for a long blooming season.
    category: garden
    price: "4.25"
    stock: 120
    image: /images/marigold-seeds.jpg
    tags: [seeds, flowers]
  - id: 7
    name: Copper Watering Can
    description: One-liter watering can with a narrow spout for seedlings.
    category: garden
    price: "34.00"
    stock: 5
    image: /images/copper-watering-can.jpg
    tags: [copper, tools]
  - id: 8
    name: Garden Twine Spool
    description: Jute twine on a refillable beechwood spool.
    category: garden
    price: "9.75"
    stock: 0
    image: /images/garden-twine.jpg
    tags: [jute, tools]
  - id: 9
    name: Ceramic Planter
    description: Glazed planter with a drainage dish, fits a 6-inch pot.
    category: garden
    price: "27.00"
    stock: 14
    image: /images/ceramic-planter.jpg
    tags: [ceramic, plants]
  - id: 10
    name: Enamel Bread Tin
    description: Cream enamel tin that keeps loaves fresh for days.
    category: kitchen
    price: "48.00"
    stock: 6
    image: /images/enamel-bread-tin.jpg
    tags: [enamel, storage]
"#;

/// Write the starter catalog to the configured catalog path.
///
/// # Errors
///
/// Returns an error if the catalog already exists (without `--force`),
/// fails validation, or cannot be written.
pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let path = &config.catalog_file;

    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    // Validate through the real loader before writing anything.
    let catalog = ProductCatalog::from_yaml_str(STARTER_CATALOG)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, STARTER_CATALOG)?;

    info!(
        path = %path.display(),
        products = catalog.len(),
        categories = catalog.categories().len(),
        "Starter catalog written"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_catalog_is_valid() {
        let catalog = ProductCatalog::from_yaml_str(STARTER_CATALOG).unwrap();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.categories(), vec!["garden", "home", "kitchen"]);
    }
}
