mod identifiers;

pub use identifiers::{CategoryId, ItemId};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::UPCOMING_LABEL;

/// A catalog entry. Built once from a fetch response and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub poster_path: Option<String>,
    pub summary: String,
    pub release_date: Option<NaiveDate>,
    pub category_ids: Option<Vec<CategoryId>>,
}

impl Item {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Year as shown in lists and used by the release-year filter.
    pub fn release_year_label(&self) -> String {
        match self.release_year() {
            Some(year) => year.to_string(),
            None => UPCOMING_LABEL.to_string(),
        }
    }

    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path.as_ref().map(|path| {
            format!(
                "{}/{}",
                image_base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        })
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        self.category_ids.as_deref().unwrap_or_default()
    }
}

/// Category id to name lookup. Snapshots are replaced whole, never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDictionary {
    names: HashMap<CategoryId, String>,
}

impl CategoryDictionary {
    pub fn new(names: HashMap<CategoryId, String>) -> Self {
        Self { names }
    }

    /// Name for `id`, or an empty string when the id is unknown.
    pub fn name(&self, id: CategoryId) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn names_for<'a>(&'a self, ids: &'a [CategoryId]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter().map(|id| self.name(*id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(CategoryId, String)> for CategoryDictionary {
    fn from_iter<I: IntoIterator<Item = (CategoryId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
