//! Search index builder.
//!
//! Builds the in-RAM Tantivy index from the product catalog, either on
//! a background task ([`build_index_async`]) or inline
//! ([`build_index_sync`], used by one-shot tools and tests).

use tantivy::Index;
use tracing::{error, info, instrument, warn};

use crate::catalog::{Product, ProductCatalog};

use super::{SearchError, SearchFields, SearchIndex};

/// Spawn a background task to build the search index.
///
/// The index will be populated asynchronously. Until complete,
/// [`SearchIndex::search`] returns empty results.
pub fn build_index_async(search_index: SearchIndex, catalog: ProductCatalog) {
    info!("Spawning background search index build task");
    tokio::spawn(async move {
        if let Err(e) = build_index_sync(&search_index, &catalog) {
            error!(error = %e, "Failed to build search index");
        }
    });
}

/// Build the index from the catalog and swap it in.
///
/// # Errors
///
/// Returns an error if the index writer fails or the built index cannot
/// be installed.
#[instrument(skip_all)]
pub fn build_index_sync(
    search_index: &SearchIndex,
    catalog: &ProductCatalog,
) -> Result<(), SearchError> {
    let (index, fields) = build(catalog)?;
    search_index.set_ready(index, fields)?;
    info!(
        docs = search_index.num_docs(),
        "Search index is ready and serving queries"
    );
    Ok(())
}

/// Build a fresh index over every catalog product.
fn build(catalog: &ProductCatalog) -> Result<(Index, SearchFields), SearchError> {
    let (schema, fields) = SearchIndex::build_schema();

    let index = Index::create_in_ram(schema);

    // Register the English stemmer tokenizer
    index.tokenizers().register(
        "en_stem",
        tantivy::tokenizer::TextAnalyzer::builder(tantivy::tokenizer::SimpleTokenizer::default())
            .filter(tantivy::tokenizer::RemoveLongFilter::limit(40))
            .filter(tantivy::tokenizer::LowerCaser)
            .filter(tantivy::tokenizer::Stemmer::new(
                tantivy::tokenizer::Language::English,
            ))
            .build(),
    );

    let mut writer = index
        .writer(50_000_000) // 50MB buffer
        .map_err(|e| SearchError::Index(format!("Failed to create writer: {e}")))?;

    let mut count = 0usize;
    for product in catalog.all() {
        if let Err(e) = writer.add_document(product_doc(&fields, product)) {
            warn!(error = %e, product = %product.id, "Failed to index product");
        } else {
            count += 1;
        }
    }

    writer
        .commit()
        .map_err(|e| SearchError::Index(format!("Failed to commit index: {e}")))?;

    info!(count, "Indexed catalog products");

    Ok((index, fields))
}

/// The index document for one product.
fn product_doc(fields: &SearchFields, product: &Product) -> tantivy::TantivyDocument {
    let effective = product.effective_price();
    tantivy::doc!(
        fields.id => i64::from(product.id.as_i32()),
        fields.name => product.name.clone(),
        fields.description => product.description.clone(),
        fields.category => product.category.clone(),
        fields.price => effective.to_string(),
        fields.price_cents => effective.cents(),
        fields.available => u64::from(product.is_available()),
        fields.on_sale => u64::from(product.on_sale),
        fields.name_text => product.name.clone(),
        fields.description_text => product.description.clone(),
        fields.tags_text => product.tags.join(" ")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture_catalog;
    use crate::search::{SearchFilters, SearchSort};
    use marigold_core::ProductId;

    fn ready_index() -> SearchIndex {
        let index = SearchIndex::new();
        build_index_sync(&index, &fixture_catalog()).unwrap();
        index
    }

    #[test]
    fn test_empty_until_built() {
        let index = SearchIndex::new();
        assert!(!index.is_ready());
        assert_eq!(index.num_docs(), 0);

        let results = index
            .search("mug", &SearchFilters::default(), SearchSort::Relevance, 10)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.query, "mug");
    }

    #[test]
    fn test_build_indexes_all_products() {
        let index = ready_index();
        assert!(index.is_ready());
        assert_eq!(index.num_docs(), 3);
    }

    #[test]
    fn test_exact_term_search() {
        let index = ready_index();
        let results = index
            .search("mug", &SearchFilters::default(), SearchSort::Relevance, 10)
            .unwrap();
        assert_eq!(results.hits.len(), 1);
        let hit = results.hits.first().unwrap();
        assert_eq!(hit.id, ProductId::new(1));
        assert_eq!(hit.name, "Stoneware Mug");
        assert_eq!(hit.price, "$18.00");
        assert!(hit.available);
    }

    #[test]
    fn test_fuzzy_search_tolerates_a_typo() {
        let index = ready_index();
        let results = index
            .search("mugg", &SearchFilters::default(), SearchSort::Relevance, 10)
            .unwrap();
        assert!(results.hits.iter().any(|hit| hit.id == ProductId::new(1)));
    }

    #[test]
    fn test_short_term_prefix_search() {
        let index = ready_index();
        let results = index
            .search("mu", &SearchFilters::default(), SearchSort::Relevance, 10)
            .unwrap();
        assert!(results.hits.iter().any(|hit| hit.id == ProductId::new(1)));
    }

    #[test]
    fn test_query_is_normalized() {
        let index = ready_index();
        let results = index
            .search("  MUG  ", &SearchFilters::default(), SearchSort::Relevance, 10)
            .unwrap();
        assert_eq!(results.query, "mug");
        assert_eq!(results.hits.len(), 1);
    }

    #[test]
    fn test_category_filter_with_empty_query() {
        let index = ready_index();
        let filters = SearchFilters {
            category: Some("kitchen".to_string()),
            ..Default::default()
        };
        let results = index
            .search("", &filters, SearchSort::Relevance, 10)
            .unwrap();
        assert_eq!(results.hits.len(), 2);
        assert!(results.hits.iter().all(|hit| hit.category == "kitchen"));
    }

    #[test]
    fn test_availability_filter() {
        let index = ready_index();
        let filters = SearchFilters {
            available: Some(true),
            ..Default::default()
        };
        let results = index
            .search("", &filters, SearchSort::Relevance, 10)
            .unwrap();
        assert_eq!(results.hits.len(), 2);
        assert!(results.hits.iter().all(|hit| hit.available));
    }

    #[test]
    fn test_on_sale_filter() {
        let index = ready_index();
        let filters = SearchFilters {
            on_sale: Some(true),
            ..Default::default()
        };
        let results = index
            .search("", &filters, SearchSort::Relevance, 10)
            .unwrap();
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits.first().unwrap().id, ProductId::new(2));
        // Effective price is the sale price.
        assert_eq!(results.hits.first().unwrap().price, "$29.00");
    }

    #[test]
    fn test_price_range_filter() {
        let index = ready_index();
        let filters = SearchFilters {
            min_price_cents: Some(1000),
            max_price_cents: Some(2000),
            ..Default::default()
        };
        let results = index
            .search("", &filters, SearchSort::Relevance, 10)
            .unwrap();
        // Mug at $18.00 and candle at $12.50; the apron's effective
        // price is $29.00.
        assert_eq!(results.hits.len(), 2);
    }

    #[test]
    fn test_price_sort_ascending() {
        let index = ready_index();
        let results = index
            .search("", &SearchFilters::default(), SearchSort::PriceAsc, 10)
            .unwrap();
        let cents: Vec<u64> = results.hits.iter().map(|hit| hit.price_cents).collect();
        assert_eq!(cents, vec![1250, 1800, 2900]);

        let results = index
            .search("", &SearchFilters::default(), SearchSort::PriceDesc, 10)
            .unwrap();
        let cents: Vec<u64> = results.hits.iter().map(|hit| hit.price_cents).collect();
        assert_eq!(cents, vec![2900, 1800, 1250]);
    }

    #[test]
    fn test_facets_ignore_filters() {
        let index = ready_index();
        let filters = SearchFilters {
            available: Some(true),
            ..Default::default()
        };
        let results = index
            .search("", &filters, SearchSort::Relevance, 10)
            .unwrap();

        assert_eq!(results.hits.len(), 2);
        // Facets describe the whole query match, not the filtered set.
        assert_eq!(results.total_count, 3);
        assert_eq!(results.in_stock_count, 2);
        assert_eq!(results.out_of_stock_count, 1);
        assert_eq!(results.on_sale_count, 1);
        assert_eq!(results.min_price_cents, 1250);
        assert_eq!(results.max_price_cents, 2900);
    }

    #[test]
    fn test_limit_truncates() {
        let index = ready_index();
        let results = index
            .search("", &SearchFilters::default(), SearchSort::Relevance, 2)
            .unwrap();
        assert_eq!(results.hits.len(), 2);
        assert_eq!(results.total_count, 3);
    }
}
