//! Widget query contributions.
//!
//! Widgets rendered on one page do not know about each other. Those that
//! can narrow the product listing expose [`QueryContributor`] through
//! [`WidgetModel::as_query_contributor`]; the pipeline folds every such
//! contribution, in page order, into one [`QueryBuilder`].

use crate::query::QueryBuilder;

/// Capability to enrich the shared listing query.
///
/// Implementations may add facet values, set the term, category, paging and
/// flags. Facet values can only be added, never removed, so one contributor
/// cannot undo another's filter. Settings without a builder mapping are
/// skipped silently.
pub trait QueryContributor {
    fn contribute_to_query(&self, query: &mut QueryBuilder);
}

/// A view object bound to one render of one page region.
pub trait WidgetModel: Send + Sync {
    /// Short type name, used in logs.
    fn kind(&self) -> &'static str;

    /// `Some` when this widget takes part in query building.
    fn as_query_contributor(&self) -> Option<&dyn QueryContributor> {
        None
    }
}

/// Runs contributors over a single builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryContributionPipeline;

impl QueryContributionPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Apply every contributing widget to `builder` in slice order.
    ///
    /// The order is the caller's (normally page declaration order) and
    /// decides which widget wins on single-valued fields.
    pub fn run(&self, mut builder: QueryBuilder, widgets: &[Box<dyn WidgetModel>]) -> QueryBuilder {
        let mut applied = 0usize;
        for widget in widgets {
            match widget.as_query_contributor() {
                Some(contributor) => {
                    contributor.contribute_to_query(&mut builder);
                    applied += 1;
                    tracing::trace!(widget = widget.kind(), "Applied query contribution");
                }
                None => {
                    tracing::trace!(widget = widget.kind(), "Widget does not contribute");
                }
            }
        }
        tracing::debug!(
            widgets = widgets.len(),
            contributors = applied,
            term = ?builder.term(),
            facets = builder.facets().len(),
            "Query contributions applied"
        );
        builder
    }
}
