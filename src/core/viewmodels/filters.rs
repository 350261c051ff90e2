use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::constants::{CATEGORY_FILTER_LABEL, RELEASE_YEAR_FILTER_LABEL, UPCOMING_LABEL};
use crate::models::{CategoryDictionary, Item};
use crate::utils::collections::{dedup_and_sort, dedup_by_id};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    /// Option labels are years, or the upcoming label for undated items
    ReleaseYear,
    /// Option labels are category names resolved through the dictionary
    Category(Arc<CategoryDictionary>),
}

/// A named predicate with a fixed option list and a mutable selection.
///
/// Selected options are OR-ed. An empty selection lets every item through.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    label: String,
    kind: FilterKind,
    options: Arc<[String]>,
    selected: BTreeSet<usize>,
}

impl Filter {
    pub fn release_year(options: Vec<String>) -> Self {
        Self {
            label: RELEASE_YEAR_FILTER_LABEL.to_string(),
            kind: FilterKind::ReleaseYear,
            options: options.into(),
            selected: BTreeSet::new(),
        }
    }

    pub fn category(options: Vec<String>, dictionary: Arc<CategoryDictionary>) -> Self {
        Self {
            label: CATEGORY_FILTER_LABEL.to_string(),
            kind: FilterKind::Category(dictionary),
            options: options.into(),
            selected: BTreeSet::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_indices(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn selected_options(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(|&i| self.options[i].as_str())
    }

    /// Replace the selection. Indices past the option list are dropped.
    pub fn set_selected(&mut self, indices: impl IntoIterator<Item = usize>) {
        let count = self.options.len();
        self.selected = indices.into_iter().filter(|&i| i < count).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn matches(&self, item: &Item, option_index: usize) -> bool {
        let Some(option) = self.options.get(option_index) else {
            return false;
        };
        match &self.kind {
            FilterKind::ReleaseYear => item.release_year_label() == option.as_str(),
            FilterKind::Category(dictionary) => dictionary
                .names_for(item.category_ids())
                .any(|name| name == option.as_str()),
        }
    }

    /// Items matching at least one selected option, in input order.
    pub fn filter(&self, items: &[Item]) -> Vec<Item> {
        if !self.is_active() {
            return items.to_vec();
        }
        items
            .iter()
            .filter(|item| self.selected.iter().any(|&i| self.matches(item, i)))
            .cloned()
            .collect()
    }

    /// Same options and kind, nothing selected.
    pub fn blank_copy(&self) -> Self {
        Self {
            label: self.label.clone(),
            kind: self.kind.clone(),
            options: Arc::clone(&self.options),
            selected: BTreeSet::new(),
        }
    }
}

/// How a sequence of filters is combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterChainMode {
    /// Each filter narrows the previous result, even down to nothing
    #[default]
    Strict,
    /// A filter that meets an empty running result is applied to the full input instead
    RestartOnEmpty,
}

pub fn is_filtering(filters: &[Filter]) -> bool {
    filters.iter().any(Filter::is_active)
}

/// Apply `filters` in order. The result holds each item id once; order is unspecified.
pub fn compose_filters(items: &[Item], filters: &[Filter], mode: FilterChainMode) -> Vec<Item> {
    if !is_filtering(filters) {
        return items.to_vec();
    }

    let mut running = items.to_vec();
    for filter in filters {
        running = match mode {
            FilterChainMode::RestartOnEmpty if running.is_empty() => filter.filter(items),
            _ => filter.filter(&running),
        };
    }

    dedup_by_id(running)
}

/// Case-insensitive title substring match. An empty query keeps everything.
pub fn search_by_title(items: &[Item], query: &str) -> Vec<Item> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Distinct years as ascending strings. Missing dates are skipped.
pub fn distinct_sorted_years(dates: impl IntoIterator<Item = Option<NaiveDate>>) -> Vec<String> {
    dedup_and_sort(dates.into_iter().map(|date| date.map(|d| d.year())))
        .into_iter()
        .map(|year| year.to_string())
        .collect()
}

/// Release-year options for `items`, with the upcoming label last when any item is undated.
pub fn release_year_options(items: &[Item]) -> Vec<String> {
    let mut options = distinct_sorted_years(items.iter().map(|item| item.release_date));
    if items.iter().any(|item| item.release_date.is_none()) {
        options.push(UPCOMING_LABEL.to_string());
    }
    options
}

/// Distinct, sorted names of the categories referenced by `items`. Unknown ids are skipped.
pub fn category_options(items: &[Item], dictionary: &CategoryDictionary) -> Vec<String> {
    dedup_and_sort(
        items
            .iter()
            .flat_map(|item| dictionary.names_for(item.category_ids()))
            .map(|name| (!name.is_empty()).then(|| name.to_string())),
    )
}

/// The release-year and category filters for `items`, nothing selected.
pub fn build_filters(items: &[Item], dictionary: Arc<CategoryDictionary>) -> Vec<Filter> {
    vec![
        Filter::release_year(release_year_options(items)),
        Filter::category(category_options(items, &dictionary), dictionary),
    ]
}
