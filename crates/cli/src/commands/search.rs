//! One-shot catalog search.
//!
//! Builds the index inline (no background build for a single query) and
//! prints hits with availability and sale badges.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use marigold_storefront::catalog::ProductCatalog;
use marigold_storefront::config::StorefrontConfig;
use marigold_storefront::search::{SearchFilters, SearchIndex, SearchSort, build_index_sync};

/// Parsed search command arguments.
pub struct SearchArgs {
    pub query: String,
    pub category: Option<String>,
    pub in_stock: bool,
    pub on_sale: bool,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: String,
    pub limit: Option<usize>,
}

/// Run a one-shot search against the configured catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a price bound does
/// not parse, or the search fails.
pub fn run(args: &SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let catalog = ProductCatalog::load(&config.catalog_file)?;

    let index = SearchIndex::new();
    build_index_sync(&index, &catalog)?;

    let filters = SearchFilters {
        category: args.category.clone(),
        available: args.in_stock.then_some(true),
        on_sale: args.on_sale.then_some(true),
        min_price_cents: parse_price_cents(args.min_price.as_deref(), "--min-price")?,
        max_price_cents: parse_price_cents(args.max_price.as_deref(), "--max-price")?,
    };
    let sort = SearchSort::parse(&args.sort);
    let limit = args.limit.unwrap_or(config.search.limit);

    let results = index.search(&args.query, &filters, sort, limit)?;

    if results.query.is_empty() {
        info!(hits = results.hits.len(), "Browsing catalog");
    } else {
        info!(
            hits = results.hits.len(),
            query = %results.query,
            "Search results"
        );
    }

    for hit in &results.hits {
        let mut badges = String::new();
        if hit.on_sale {
            badges.push_str(" [sale]");
        }
        if !hit.available {
            badges.push_str(" [out of stock]");
        }
        info!("  #{} {} - {}{badges}", hit.id, hit.name, hit.price);
    }

    info!(
        matching = results.total_count,
        in_stock = results.in_stock_count,
        on_sale = results.on_sale_count,
        "Facets"
    );

    Ok(())
}

/// Parse a dollar amount like "9.99" into cents.
fn parse_price_cents(
    raw: Option<&str>,
    flag: &str,
) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let amount: Decimal = raw
        .parse()
        .map_err(|_| format!("{flag} must be a price like 9.99, got {raw}"))?;
    let cents = (amount * Decimal::from(100u32))
        .round()
        .to_u64()
        .ok_or_else(|| format!("{flag} is out of range: {raw}"))?;
    Ok(Some(cents))
}
