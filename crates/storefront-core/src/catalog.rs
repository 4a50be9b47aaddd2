//! Listing execution: the in-memory catalog and the page render entry point.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contributor::{QueryContributionPipeline, WidgetModel};
use crate::error::Result;
use crate::ports::CatalogQueryExecutor;
use crate::query::{QueryBuilder, QueryFlag};
use crate::types::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Facet key to this product's value, e.g. `color -> red`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Product {
    pub fn new(id: &str, name: &str, category: &str) -> Self {
        Self {
            id: ProductId::from(id),
            name: name.to_string(),
            category: category.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// Facet key -> value -> number of matching products
pub type FacetCounts = BTreeMap<String, BTreeMap<String, usize>>;

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Matches before paging.
    pub total_count: usize,
    pub start_index: usize,
    pub products: Vec<Product>,
    pub include_store_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetCounts>,
    pub query: QueryBuilder,
}

/// Executes queries against a fixed product list.
///
/// Facet filters are AND across keys and OR within a key. The term matches
/// name or category case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn matches(product: &Product, query: &QueryBuilder) -> bool {
        if let Some(category) = query.category() {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(term) = query.term() {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.category.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        query.facets().iter().all(|(key, accepted)| {
            product
                .attributes
                .get(key)
                .is_some_and(|value| accepted.contains(value))
        })
    }
}

fn facet_counts<'a>(products: impl Iterator<Item = &'a Product>) -> FacetCounts {
    let mut counts = FacetCounts::new();
    for product in products {
        for (key, value) in &product.attributes {
            *counts
                .entry(key.clone())
                .or_default()
                .entry(value.clone())
                .or_insert(0) += 1;
        }
    }
    counts
}

#[async_trait]
impl CatalogQueryExecutor for InMemoryCatalog {
    async fn execute(&self, query: QueryBuilder) -> Result<QueryResult> {
        let matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| Self::matches(p, &query))
            .collect();

        let start = query.start_index();
        let page = matched
            .iter()
            .skip(start)
            .take(query.view_size().unwrap_or(usize::MAX))
            .map(|p| (*p).clone())
            .collect();

        let facets = query
            .has_flag(QueryFlag::IncludeFacets)
            .then(|| facet_counts(matched.iter().copied()));

        Ok(QueryResult {
            total_count: matched.len(),
            start_index: start,
            products: page,
            include_store_link: query.has_flag(QueryFlag::IncludeStoreLink),
            facets,
            query,
        })
    }
}

/// Build the listing query from the page's widgets and execute it once.
pub async fn render_listing(
    widgets: &[Box<dyn WidgetModel>],
    executor: &dyn CatalogQueryExecutor,
) -> Result<QueryResult> {
    let query = QueryContributionPipeline::new().run(QueryBuilder::new(), widgets);
    executor.execute(query).await
}
