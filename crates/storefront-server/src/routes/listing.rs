//! GET /api/listing: product listing assembled from page widgets.
//!
//! Query parameters map onto the widgets a listing page declares, in this
//! order: breadcrumb (`store_link`), category (`category`), facet panel
//! (`facet=key:value`, repeatable; `facet_counts`), search box (`term`),
//! product lister (`start`, `size`), promotion.

use axum::{
    extract::{Query, State},
    Json,
};
use storefront_core::widgets::{
    BreadcrumbWidget, CategoryWidget, FacetsWidget, ProductListerWidget, PromotionWidget,
    SearchWidget,
};
use storefront_core::{render_listing, QueryResult, WidgetModel};

use crate::error::{AppError, JsonError};
use crate::state::AppState;

pub async fn listing(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResult>, JsonError> {
    let widgets = page_widgets(&params)?;
    let result = render_listing(&widgets, state.catalog.as_ref()).await?;
    Ok(Json(result))
}

fn page_widgets(params: &[(String, String)]) -> Result<Vec<Box<dyn WidgetModel>>, AppError> {
    let mut breadcrumb = BreadcrumbWidget::default();
    let mut category = CategoryWidget::default();
    let mut facets = FacetsWidget::default();
    let mut search = SearchWidget::default();
    let mut lister = ProductListerWidget::default();

    for (key, value) in params {
        match key.as_str() {
            "store_link" => breadcrumb.include_store_link = parse_flag(value),
            "category" => category.category = Some(value.clone()),
            "facet" => {
                let (facet, selected) = value.split_once(':').ok_or_else(|| {
                    AppError::BadRequest(format!("facet must be key:value, got {value:?}"))
                })?;
                facets = facets.select(facet, selected);
            }
            "facet_counts" => facets.show_counts = parse_flag(value),
            "term" => search.term = Some(value.clone()),
            "start" => lister.start_index = Some(parse_number(key, value)?),
            "size" => lister.view_size = Some(parse_number(key, value)?),
            other => tracing::trace!(param = other, "Ignoring unknown listing parameter"),
        }
    }

    Ok(vec![
        Box::new(breadcrumb),
        Box::new(category),
        Box::new(facets),
        Box::new(search),
        Box::new(lister),
        Box::new(PromotionWidget::default()),
    ])
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_number(key: &str, value: &str) -> Result<usize, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{key} must be a non-negative integer")))
}
