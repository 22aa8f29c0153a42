//! Full-text product search using Tantivy.
//!
//! The index lives in RAM and is built from the catalog. The engine
//! starts immediately with an empty index; a background task builds the
//! real one and swaps it in atomically when ready (see [`indexer`]).
//! Until then every search returns empty results.
//!
//! Querying combines exact and fuzzy term matches with regex prefix
//! matching for short terms, so search-as-you-type behaves sensibly
//! from the first keystroke.

mod indexer;

pub mod debounce;
pub mod store;

use std::ops::Bound;
use std::sync::{Arc, RwLock};

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, RangeQuery, RegexQuery, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::{Index, IndexReader, ReloadPolicy, Term};
use tracing::instrument;

use marigold_core::ProductId;

pub use debounce::Debouncer;
pub use indexer::{build_index_async, build_index_sync};
pub use store::{SearchCriteria, SearchStore};

/// A search hit: one product, with enough stored data to render a card.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Display price of the effective unit price, e.g. "$18.00".
    pub price: String,
    pub price_cents: u64,
    pub available: bool,
    pub on_sale: bool,
    pub score: f32,
}

/// Schema field handles for the search index.
#[derive(Clone)]
pub struct SearchFields {
    // Stored fields (returned in results)
    pub id: Field,
    pub name: Field,
    pub description: Field,
    pub category: Field,
    pub price: Field,
    pub price_cents: Field,
    pub available: Field,
    pub on_sale: Field,
    // Text fields for full-text search (not stored, just indexed)
    pub name_text: Field,
    pub description_text: Field,
    pub tags_text: Field,
}

/// Inner index state (once built).
struct ReadyIndex {
    #[allow(dead_code)]
    index: Index,
    reader: IndexReader,
    fields: SearchFields,
}

/// The search index handle.
///
/// Starts empty and is populated by [`build_index_async`] or
/// [`build_index_sync`]. Cheaply cloneable; clones share the index.
#[derive(Clone)]
pub struct SearchIndex {
    inner: Arc<RwLock<Option<ReadyIndex>>>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    /// Create a new empty search index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if the index is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Set the built index. Called by the index builder.
    pub(crate) fn set_ready(&self, index: Index, fields: SearchFields) -> Result<(), SearchError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        let ready = ReadyIndex {
            index,
            reader,
            fields,
        };

        *self
            .inner
            .write()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))? = Some(ready);

        Ok(())
    }

    /// Build the schema for the search index.
    pub(crate) fn build_schema() -> (Schema, SearchFields) {
        use tantivy::schema::{NumericOptions, STRING};

        let mut schema_builder = Schema::builder();

        let id = schema_builder.add_i64_field("id", NumericOptions::default().set_stored());

        // Stored fields for rendering hits
        let name = schema_builder.add_text_field("name", STORED);
        let description = schema_builder.add_text_field("description", STORED);
        // STRING means indexed but not tokenized (exact match for the
        // category filter)
        let category = schema_builder.add_text_field("category", STRING | STORED);
        let price = schema_builder.add_text_field("price", STORED);

        // Numeric fields for filtering/sorting
        let numeric = || {
            NumericOptions::default()
                .set_stored()
                .set_indexed()
                .set_fast()
        };
        let price_cents = schema_builder.add_u64_field("price_cents", numeric());
        let available = schema_builder.add_u64_field("available", numeric());
        let on_sale = schema_builder.add_u64_field("on_sale", numeric());

        // Text indexing options for full-text search
        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer("en_stem")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        let name_text = schema_builder.add_text_field("name_text", text_options.clone());
        let description_text = schema_builder.add_text_field("description_text", text_options.clone());
        let tags_text = schema_builder.add_text_field("tags_text", text_options);

        let schema = schema_builder.build();
        let fields = SearchFields {
            id,
            name,
            description,
            category,
            price,
            price_cents,
            available,
            on_sale,
            name_text,
            description_text,
            tags_text,
        };

        (schema, fields)
    }

    /// Search the index.
    ///
    /// An empty query matches everything, so filter-only browsing works.
    /// Returns empty results if the index isn't ready yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned or the query
    /// fails.
    #[instrument(skip(self))]
    // Allow: the RwLockReadGuard must be held for the entire search because
    // `ready` borrows from the guard's protected data.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search(
        &self,
        query_str: &str,
        filters: &SearchFilters,
        sort: SearchSort,
        limit: usize,
    ) -> Result<SearchResults, SearchError> {
        let query_str = query_str.trim().to_lowercase();

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        let Some(ready) = guard.as_ref() else {
            return Ok(SearchResults {
                query: query_str,
                ..Default::default()
            });
        };

        let searcher = ready.reader.searcher();

        // Boxed queries are not cloneable, so the text query is built
        // twice: once filtered for hits, once bare for facets.
        let query = Self::apply_filters(
            Self::text_query(&ready.fields, &query_str),
            &ready.fields,
            filters,
        );
        let text_query = Self::text_query(&ready.fields, &query_str);

        // Collect results based on sort order
        let hits = match sort {
            SearchSort::Relevance => {
                let top_docs = searcher
                    .search(&query, &TopDocs::with_limit(limit))
                    .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;
                Self::collect_hits(&searcher, &ready.fields, top_docs)?
            }
            SearchSort::PriceAsc | SearchSort::PriceDesc => {
                // For price sorting, collect a wider window and sort
                // manually; fast-field sorting needs more setup.
                let top_docs = searcher
                    .search(&query, &TopDocs::with_limit(limit * 2))
                    .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;
                let mut hits = Self::collect_hits(&searcher, &ready.fields, top_docs)?;

                hits.sort_by(|a, b| {
                    if sort == SearchSort::PriceAsc {
                        a.price_cents.cmp(&b.price_cents)
                    } else {
                        b.price_cents.cmp(&a.price_cents)
                    }
                });

                hits.truncate(limit);
                hits
            }
        };

        let facets = Self::compute_facets(&searcher, &ready.fields, &*text_query)?;

        Ok(SearchResults {
            hits,
            query: query_str,
            total_count: facets.total,
            in_stock_count: facets.in_stock,
            out_of_stock_count: facets.out_of_stock,
            on_sale_count: facets.on_sale,
            min_price_cents: facets.min_price,
            max_price_cents: facets.max_price,
        })
    }

    /// Build the text part of the query.
    ///
    /// Short terms get regex prefix matching so a single keystroke
    /// already narrows results; longer terms combine exact and fuzzy
    /// matches across name, description, and tags.
    fn text_query(fields: &SearchFields, query_str: &str) -> Box<dyn Query> {
        if query_str.is_empty() {
            return Box::new(tantivy::query::AllQuery);
        }

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for term in query_str.split_whitespace() {
            if term.len() < 3 {
                let prefix_pattern = format!("{}.*", escape_regex(term));
                if let Ok(regex_query) =
                    RegexQuery::from_pattern(&prefix_pattern, fields.name_text)
                {
                    subqueries.push((Occur::Should, Box::new(regex_query)));
                }
                if let Ok(regex_query) =
                    RegexQuery::from_pattern(&prefix_pattern, fields.tags_text)
                {
                    subqueries.push((Occur::Should, Box::new(regex_query)));
                }
            } else {
                let name_term = Term::from_field_text(fields.name_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(name_term.clone(), IndexRecordOption::Basic)),
                ));
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(name_term, 1, true)),
                ));

                let desc_term = Term::from_field_text(fields.description_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(desc_term, 1, true)),
                ));

                let tags_term = Term::from_field_text(fields.tags_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(tags_term, IndexRecordOption::Basic)),
                ));
            }
        }

        Box::new(BooleanQuery::new(subqueries))
    }

    /// Apply filters to a query.
    fn apply_filters(
        base_query: Box<dyn Query>,
        fields: &SearchFields,
        filters: &SearchFilters,
    ) -> Box<dyn Query> {
        let mut must_clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, base_query)];

        if let Some(category) = &filters.category {
            let term = Term::from_field_text(fields.category, category);
            must_clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        if let Some(available) = filters.available {
            let term = Term::from_field_u64(fields.available, u64::from(available));
            must_clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        if let Some(on_sale) = filters.on_sale {
            let term = Term::from_field_u64(fields.on_sale, u64::from(on_sale));
            must_clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        if filters.min_price_cents.is_some() || filters.max_price_cents.is_some() {
            let min = filters.min_price_cents.unwrap_or(0);
            let max = filters.max_price_cents.unwrap_or(u64::MAX);
            let range_query = RangeQuery::new(
                Bound::Included(Term::from_field_u64(fields.price_cents, min)),
                Bound::Included(Term::from_field_u64(fields.price_cents, max)),
            );
            must_clauses.push((Occur::Must, Box::new(range_query)));
        }

        Box::new(BooleanQuery::new(must_clauses))
    }

    /// Collect search hits from top docs.
    fn collect_hits(
        searcher: &tantivy::Searcher,
        fields: &SearchFields,
        top_docs: Vec<(f32, tantivy::DocAddress)>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut hits = Vec::new();
        for (score, doc_address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            hits.push(Self::doc_to_hit(fields, &doc, score));
        }
        Ok(hits)
    }

    /// Facet counts over everything the text query matches, before
    /// filters - the numbers a filter panel shows next to its options.
    fn compute_facets(
        searcher: &tantivy::Searcher,
        fields: &SearchFields,
        text_query: &dyn Query,
    ) -> Result<Facets, SearchError> {
        // Iterate all text matches; the catalog is small by web-index
        // standards.
        let all_docs = searcher
            .search(text_query, &TopDocs::with_limit(10_000))
            .map_err(|e| SearchError::Query(format!("Facet query failed: {e}")))?;

        let mut facets = Facets {
            min_price: u64::MAX,
            ..Default::default()
        };

        for (_score, doc_address) in all_docs {
            let Ok(doc) = searcher.doc::<tantivy::TantivyDocument>(doc_address) else {
                continue;
            };
            let get_u64 =
                |field: Field| -> u64 { doc.get_first(field).and_then(|v| v.as_u64()).unwrap_or(0) };

            facets.total += 1;
            if get_u64(fields.available) == 1 {
                facets.in_stock += 1;
            } else {
                facets.out_of_stock += 1;
            }
            if get_u64(fields.on_sale) == 1 {
                facets.on_sale += 1;
            }

            let price = get_u64(fields.price_cents);
            facets.min_price = facets.min_price.min(price);
            facets.max_price = facets.max_price.max(price);
        }

        if facets.min_price == u64::MAX {
            facets.min_price = 0;
        }

        Ok(facets)
    }

    /// Convert a Tantivy document to a search hit.
    fn doc_to_hit(fields: &SearchFields, doc: &tantivy::TantivyDocument, score: f32) -> SearchHit {
        let get_text = |field: Field| -> String {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let get_u64 =
            |field: Field| -> u64 { doc.get_first(field).and_then(|v| v.as_u64()).unwrap_or(0) };

        let raw_id = doc
            .get_first(fields.id)
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        SearchHit {
            id: ProductId::new(i32::try_from(raw_id).unwrap_or_default()),
            name: get_text(fields.name),
            description: get_text(fields.description),
            category: get_text(fields.category),
            price: get_text(fields.price),
            price_cents: get_u64(fields.price_cents),
            available: get_u64(fields.available) == 1,
            on_sale: get_u64(fields.on_sale) == 1,
            score,
        }
    }

    /// Get the number of documents in the index, or 0 if not ready.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|r| r.reader.searcher().num_docs()))
            .unwrap_or(0)
    }
}

/// Escape regex metacharacters in a search term.
fn escape_regex(term: &str) -> String {
    term.chars()
        .flat_map(|c| match c {
            '.' | '*' | '+' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                vec!['\\', c]
            }
            _ => vec![c],
        })
        .collect()
}

/// Search filters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct SearchFilters {
    /// Restrict to one category (exact match).
    pub category: Option<String>,
    /// Filter by availability (Some(true) = in stock only).
    pub available: Option<bool>,
    /// Filter by sale state (Some(true) = on sale only).
    pub on_sale: Option<bool>,
    /// Minimum effective price in cents (inclusive).
    pub min_price_cents: Option<u64>,
    /// Maximum effective price in cents (inclusive).
    pub max_price_cents: Option<u64>,
}

/// Search sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSort {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SearchSort {
    /// Parse from a user-supplied value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-ascending" | "price_asc" => Self::PriceAsc,
            "price-descending" | "price_desc" => Self::PriceDesc,
            _ => Self::Relevance,
        }
    }

    /// The canonical parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-ascending",
            Self::PriceDesc => "price-descending",
        }
    }
}

/// Facet counters accumulated over a text query.
#[derive(Debug, Default)]
struct Facets {
    total: usize,
    in_stock: usize,
    out_of_stock: usize,
    on_sale: usize,
    min_price: u64,
    max_price: u64,
}

/// Search results with facet counts.
#[derive(Debug, Default, Clone)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub query: String,
    /// Total number of products matching the query (before filters).
    pub total_count: usize,
    /// Number of in-stock products matching the query.
    pub in_stock_count: usize,
    /// Number of out-of-stock products matching the query.
    pub out_of_stock_count: usize,
    /// Number of on-sale products matching the query.
    pub on_sale_count: usize,
    /// Minimum effective price in cents across matches.
    pub min_price_cents: u64,
    /// Maximum effective price in cents across matches.
    pub max_price_cents: u64,
}

impl SearchResults {
    /// Check if there are any hits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
}
