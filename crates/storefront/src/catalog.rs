//! The product catalog.
//!
//! Products are loaded once from a YAML file at startup, validated, and
//! held in memory behind an `Arc` for the lifetime of the engine. The
//! catalog is the single source of truth for pricing and stock; the
//! cart re-validates against it on hydration.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{CurrencyCode, Price, ProductId, StockLevel};

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid YAML.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Two products share an ID.
    #[error("Duplicate product id {0}")]
    DuplicateId(ProductId),

    /// A product is flagged on sale without a sale price.
    #[error("Product {0} is on sale but has no sale price")]
    MissingSalePrice(ProductId),
}

/// A product as sold by the storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub on_sale: bool,
    pub stock: u32,
    pub image: String,
    pub tags: Vec<String>,
}

impl Product {
    /// The price a unit actually sells for right now.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        match (self.on_sale, self.sale_price) {
            (true, Some(sale)) => sale,
            _ => self.price,
        }
    }

    /// Stock bucket for badges and availability filtering.
    #[must_use]
    pub const fn stock_level(&self) -> StockLevel {
        StockLevel::for_quantity(self.stock)
    }

    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock_level().is_available()
    }
}

/// On-disk shape of the catalog file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Currency all product prices are quoted in.
    #[serde(default)]
    pub currency: CurrencyCode,
    pub products: Vec<ProductRecord>,
}

/// On-disk shape of a single product.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub on_sale: bool,
    pub stock: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductRecord {
    fn into_product(self, currency: CurrencyCode) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: Price::new(self.price, currency),
            sale_price: self.sale_price.map(|amount| Price::new(amount, currency)),
            on_sale: self.on_sale,
            stock: self.stock,
            image: self.image,
            tags: self.tags,
        }
    }
}

/// The loaded, validated product set.
///
/// Cheaply cloneable; clones share the same product data.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Arc<Vec<Product>>,
    by_id: Arc<HashMap<ProductId, usize>>,
    currency: CurrencyCode,
}

impl ProductCatalog {
    /// Load and validate the catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&raw)?;
        tracing::info!(
            products = catalog.len(),
            categories = catalog.categories().len(),
            path = %path.display(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        let currency = file.currency;
        let products = file
            .products
            .into_iter()
            .map(|record| record.into_product(currency))
            .collect();
        Self::from_products(products, currency)
    }

    /// Build a catalog from already-constructed products.
    ///
    /// # Errors
    ///
    /// Returns an error if two products share an ID or a product is
    /// flagged on sale without a sale price.
    pub fn from_products(
        products: Vec<Product>,
        currency: CurrencyCode,
    ) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(products.len());
        for (index, product) in products.iter().enumerate() {
            if by_id.insert(product.id, index).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.on_sale && product.sale_price.is_none() {
                return Err(CatalogError::MissingSalePrice(product.id));
            }
            if let Some(sale) = product.sale_price
                && sale.amount >= product.price.amount
            {
                tracing::warn!(product = %product.id, "Sale price is not below the regular price");
            }
        }

        Ok(Self {
            products: Arc::new(products),
            by_id: Arc::new(by_id),
            currency,
        })
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.by_id.get(&id).and_then(|&index| self.products.get(index))
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .products
            .iter()
            .map(|product| product.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// The currency products are quoted in.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A small fixture catalog shared by store tests.
    pub(crate) fn fixture_catalog() -> ProductCatalog {
        ProductCatalog::from_yaml_str(FIXTURE_YAML).unwrap()
    }

    pub(crate) const FIXTURE_YAML: &str = r#"
currency: USD
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
    stock: 0
    image: /images/beeswax-candle.jpg
    tags: [candle, gift]
"#;

    #[test]
    fn test_from_yaml_str() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.currency(), CurrencyCode::USD);

        let mug = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(mug.name, "Stoneware Mug");
        assert_eq!(mug.price.to_string(), "$18.00");
        assert!(!mug.on_sale);
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let catalog = fixture_catalog();
        let apron = catalog.get(ProductId::new(2)).unwrap();
        assert_eq!(apron.effective_price().to_string(), "$29.00");

        let mug = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(mug.effective_price(), mug.price);
    }

    #[test]
    fn test_stock_levels() {
        let catalog = fixture_catalog();
        assert_eq!(
            catalog.get(ProductId::new(1)).unwrap().stock_level(),
            StockLevel::InStock
        );
        assert_eq!(
            catalog.get(ProductId::new(2)).unwrap().stock_level(),
            StockLevel::LowStock
        );
        assert_eq!(
            catalog.get(ProductId::new(3)).unwrap().stock_level(),
            StockLevel::OutOfStock
        );
        assert!(!catalog.get(ProductId::new(3)).unwrap().is_available());
    }

    #[test]
    fn test_categories_sorted_unique() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.categories(), vec!["home", "kitchen"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let yaml = r#"
products:
  - { id: 1, name: A, category: c, price: "1.00", stock: 1 }
  - { id: 1, name: B, category: c, price: "2.00", stock: 1 }
"#;
        assert!(matches!(
            ProductCatalog::from_yaml_str(yaml),
            Err(CatalogError::DuplicateId(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_on_sale_requires_sale_price() {
        let yaml = r#"
products:
  - { id: 1, name: A, category: c, price: "1.00", stock: 1, on_sale: true }
"#;
        assert!(matches!(
            ProductCatalog::from_yaml_str(yaml),
            Err(CatalogError::MissingSalePrice(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ProductCatalog::load(Path::new("/nonexistent/catalog.yaml"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
