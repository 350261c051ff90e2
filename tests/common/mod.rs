#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use marquee::{CatalogClient, CatalogError, CatalogResult, CategoryDictionary, Item, ItemId};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

/// In-process catalog serving the fixture data.
#[derive(Debug, Default)]
pub struct FixtureCatalog {
    failing: Mutex<HashSet<ItemId>>,
}

impl FixtureCatalog {
    pub fn fail_lookup(&self, id: ItemId) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn heal_lookup(&self, id: ItemId) {
        self.failing.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl CatalogClient for FixtureCatalog {
    async fn fetch_categories(&self) -> CatalogResult<CategoryDictionary> {
        Ok(fixtures::categories())
    }

    async fn fetch_popular(&self, page: u32) -> CatalogResult<Vec<Item>> {
        match page {
            1 => Ok(fixtures::catalog()),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_item(&self, id: ItemId) -> CatalogResult<Item> {
        if self.failing.lock().unwrap().contains(&id) {
            return Err(CatalogError::Transport("connection reset".into()));
        }
        fixtures::catalog()
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| CatalogError::from_status(404, String::new()))
    }

    async fn search_items(&self, query: &str) -> CatalogResult<Vec<Item>> {
        let needle = query.to_lowercase();
        Ok(fixtures::catalog()
            .into_iter()
            .filter(|item| item.title.to_lowercase().contains(&needle))
            .collect())
    }
}

/// Poll `condition` until it holds or `max_wait` runs out.
pub async fn wait_for(mut condition: impl FnMut() -> bool, max_wait: Duration) -> bool {
    let start = std::time::Instant::now();

    while start.elapsed() < max_wait {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }

    false
}
