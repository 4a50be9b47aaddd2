//! Mutable accumulator for one product-listing query.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Boolean switches a widget may raise on the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFlag {
    /// Render a link back to the store root alongside the results.
    IncludeStoreLink,
    /// Return facet counts with the results.
    IncludeFacets,
}

/// Query constraints gathered from the widgets on one page render.
///
/// Facet filters only ever grow: adding a value is a set union, so repeated
/// or reordered contributions of the same value leave the same filter set.
/// Single-valued fields (term, category, paging) are last-writer-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryBuilder {
    facets: BTreeMap<String, BTreeSet<String>>,
    term: Option<String>,
    category: Option<String>,
    start_index: Option<usize>,
    view_size: Option<usize>,
    flags: BTreeSet<QueryFlag>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_facet(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.facets
            .entry(key.into())
            .or_default()
            .insert(value.into());
        self
    }

    pub fn add_facet_values<I, V>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let accepted = self.facets.entry(key.into()).or_default();
        accepted.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn set_term(&mut self, term: impl Into<String>) -> &mut Self {
        self.term = Some(term.into());
        self
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.category = Some(category.into());
        self
    }

    pub fn set_start_index(&mut self, start_index: usize) -> &mut Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn set_view_size(&mut self, view_size: usize) -> &mut Self {
        self.view_size = Some(view_size);
        self
    }

    pub fn set_flag(&mut self, flag: QueryFlag, on: bool) -> &mut Self {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
        self
    }

    pub fn facets(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.facets
    }

    pub fn facet(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.facets.get(key)
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn start_index(&self) -> usize {
        self.start_index.unwrap_or(0)
    }

    pub fn view_size(&self) -> Option<usize> {
        self.view_size
    }

    pub fn has_flag(&self, flag: QueryFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn flags(&self) -> impl Iterator<Item = QueryFlag> + '_ {
        self.flags.iter().copied()
    }
}
