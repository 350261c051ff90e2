use std::collections::{BTreeSet, HashSet};

use crate::models::Item;

/// Drop missing values and duplicates, then sort ascending.
pub fn dedup_and_sort<T: Ord>(values: impl IntoIterator<Item = Option<T>>) -> Vec<T> {
    values
        .into_iter()
        .flatten()
        .collect::<BTreeSet<T>>()
        .into_iter()
        .collect()
}

/// Keep the first occurrence of every item id.
pub fn dedup_by_id(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect()
}

pub fn sort_by_title(items: &mut [Item]) {
    items.sort_by(|a, b| a.title.cmp(&b.title));
}
