//! Page widget models.
//!
//! Most of these contribute to the listing query. [`PromotionWidget`] does
//! not, and is passed over by the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::contributor::{QueryContributor, WidgetModel};
use crate::query::{QueryBuilder, QueryFlag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BreadcrumbWidget {
    pub include_store_link: bool,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub total_items: usize,
}

impl WidgetModel for BreadcrumbWidget {
    fn kind(&self) -> &'static str {
        "breadcrumb"
    }

    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        Some(self)
    }
}

impl QueryContributor for BreadcrumbWidget {
    fn contribute_to_query(&self, query: &mut QueryBuilder) {
        if self.include_store_link {
            query.set_flag(QueryFlag::IncludeStoreLink, true);
        }
    }
}

/// Facet panel; the user's current selections become facet filters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FacetsWidget {
    pub selected: BTreeMap<String, BTreeSet<String>>,
    pub show_counts: bool,
}

impl FacetsWidget {
    pub fn select(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selected.entry(key.into()).or_default().insert(value.into());
        self
    }
}

impl WidgetModel for FacetsWidget {
    fn kind(&self) -> &'static str {
        "facets"
    }

    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        Some(self)
    }
}

impl QueryContributor for FacetsWidget {
    fn contribute_to_query(&self, query: &mut QueryBuilder) {
        for (key, values) in &self.selected {
            query.add_facet_values(key.as_str(), values.iter().map(String::as_str));
        }
        if self.show_counts {
            query.set_flag(QueryFlag::IncludeFacets, true);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchWidget {
    pub term: Option<String>,
}

impl WidgetModel for SearchWidget {
    fn kind(&self) -> &'static str {
        "search"
    }

    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        Some(self)
    }
}

impl QueryContributor for SearchWidget {
    fn contribute_to_query(&self, query: &mut QueryBuilder) {
        // blank input leaves any earlier term in place
        if let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query.set_term(term);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryWidget {
    pub category: Option<String>,
}

impl WidgetModel for CategoryWidget {
    fn kind(&self) -> &'static str {
        "category"
    }

    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        Some(self)
    }
}

impl QueryContributor for CategoryWidget {
    fn contribute_to_query(&self, query: &mut QueryBuilder) {
        if let Some(category) = &self.category {
            query.set_category(category.as_str());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Grid,
    List,
}

/// Product result list with paging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductListerWidget {
    pub view_size: Option<usize>,
    pub start_index: Option<usize>,
    /// Rendering-only; the query has nothing to map it to.
    pub view_type: ViewType,
}

impl WidgetModel for ProductListerWidget {
    fn kind(&self) -> &'static str {
        "product-lister"
    }

    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        Some(self)
    }
}

impl QueryContributor for ProductListerWidget {
    fn contribute_to_query(&self, query: &mut QueryBuilder) {
        if let Some(size) = self.view_size.filter(|s| *s > 0) {
            query.set_view_size(size);
        }
        if let Some(start) = self.start_index {
            query.set_start_index(start);
        }
    }
}

/// Static promotional content.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromotionWidget {
    pub title: String,
    pub image_url: Option<String>,
}

impl WidgetModel for PromotionWidget {
    fn kind(&self) -> &'static str {
        "promotion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::QueryContributionPipeline;

    fn fold(widgets: Vec<Box<dyn WidgetModel>>) -> QueryBuilder {
        QueryContributionPipeline::new().run(QueryBuilder::new(), &widgets)
    }

    #[test]
    fn breadcrumb_maps_store_link_flag() {
        let q = fold(vec![Box::new(BreadcrumbWidget {
            include_store_link: true,
            ..Default::default()
        })]);
        assert!(q.has_flag(QueryFlag::IncludeStoreLink));

        let q = fold(vec![Box::new(BreadcrumbWidget::default())]);
        assert!(!q.has_flag(QueryFlag::IncludeStoreLink));
    }

    #[test]
    fn facets_widget_adds_selected_values() {
        let facets = FacetsWidget {
            show_counts: true,
            ..Default::default()
        }
        .select("color", "red")
        .select("color", "blue");
        let q = fold(vec![Box::new(facets)]);
        assert_eq!(q.facet("color").unwrap().len(), 2);
        assert!(q.has_flag(QueryFlag::IncludeFacets));
    }

    #[test]
    fn blank_search_keeps_earlier_term() {
        let q = fold(vec![
            Box::new(SearchWidget {
                term: Some("boots".into()),
            }),
            Box::new(SearchWidget {
                term: Some("   ".into()),
            }),
        ]);
        assert_eq!(q.term(), Some("boots"));
    }

    #[test]
    fn unmapped_view_type_is_a_noop() {
        let lister = ProductListerWidget {
            view_type: ViewType::List,
            ..Default::default()
        };
        let q = fold(vec![Box::new(lister)]);
        assert_eq!(q, QueryBuilder::new());
    }

    #[test]
    fn lister_sets_paging() {
        let q = fold(vec![Box::new(ProductListerWidget {
            view_size: Some(12),
            start_index: Some(24),
            view_type: ViewType::Grid,
        })]);
        assert_eq!(q.view_size(), Some(12));
        assert_eq!(q.start_index(), 24);
    }

    #[test]
    fn promotion_has_no_contribution_capability() {
        let promo = PromotionWidget::default();
        assert!(promo.as_query_contributor().is_none());
        let q = fold(vec![Box::new(promo), Box::new(CategoryWidget {
            category: Some("shoes".into()),
        })]);
        assert_eq!(q.category(), Some("shoes"));
    }
}
