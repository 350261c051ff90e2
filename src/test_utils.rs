#![cfg(test)]

/// The six-item catalog the list tests are written against.
pub mod fixtures {
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    use crate::models::{CategoryDictionary, CategoryId, Item, ItemId};

    pub const ANIMATION: CategoryId = CategoryId::new(0);
    pub const COMEDY: CategoryId = CategoryId::new(1);
    pub const ADVENTURE: CategoryId = CategoryId::new(2);
    pub const DRAMA: CategoryId = CategoryId::new(3);

    pub fn item(id: i64, title: &str, date: Option<&str>, categories: &[CategoryId]) -> Item {
        Item {
            id: ItemId::new(id),
            title: title.to_string(),
            poster_path: Some(format!("/poster_{}.jpg", id)),
            summary: format!("Summary of {}", title),
            release_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            category_ids: Some(categories.to_vec()),
        }
    }

    pub fn categories() -> CategoryDictionary {
        [
            (ANIMATION, "Animation".to_string()),
            (COMEDY, "Comedy".to_string()),
            (ADVENTURE, "Adventure".to_string()),
            (DRAMA, "Drama".to_string()),
        ]
        .into_iter()
        .collect()
    }

    pub fn catalog() -> Vec<Item> {
        vec![
            item(0, "The Little Mermaid", Some("1989-12-12"), &[ANIMATION, DRAMA]),
            item(1, "The Princess and the Frog", Some("2009-12-12"), &[ANIMATION]),
            item(2, "Tangled", Some("2010-12-12"), &[COMEDY]),
            item(3, "Moana", Some("2016-12-12"), &[COMEDY, ADVENTURE]),
            item(4, "Zootopia", Some("2016-12-12"), &[COMEDY, ADVENTURE, DRAMA]),
            item(5, "Shrek Forever After", Some("2010-12-12"), &[ANIMATION, DRAMA]),
        ]
    }

    pub fn favorite_ids() -> BTreeSet<ItemId> {
        [0, 1, 2, 5].into_iter().map(ItemId::new).collect()
    }

    pub fn favorites() -> Vec<Item> {
        let ids = favorite_ids();
        catalog()
            .into_iter()
            .filter(|item| ids.contains(&item.id))
            .collect()
    }

    /// Items served for popular pages after the first.
    pub fn generated_page(page: u32) -> Vec<Item> {
        (0..3)
            .map(|k| {
                let id = i64::from(page) * 100 + k;
                item(id, &format!("Page {} Item {}", page, k), Some("2020-01-01"), &[DRAMA])
            })
            .collect()
    }
}

/// Common test utilities
pub mod common {
    use std::time::Duration;
    use tokio::time::sleep;

    /// Poll `condition` until it holds or `max_wait` passes.
    pub async fn wait_for<F>(mut condition: F, max_wait: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < max_wait {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(5)).await;
        }

        condition()
    }

    /// Let spawned tasks drain without waiting for a specific condition.
    pub async fn settle() {
        sleep(Duration::from_millis(50)).await;
    }
}

/// Mock catalog client for testing
pub mod mock_catalog {
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use super::fixtures;
    use crate::backends::traits::CatalogClient;
    use crate::models::{CategoryDictionary, Item, ItemId};
    use crate::utils::{CatalogError, CatalogResult};

    #[derive(Debug, Default)]
    pub struct MockCatalogClient {
        categories: CategoryDictionary,
        items: HashMap<ItemId, Item>,
        failing_items: Mutex<HashSet<ItemId>>,
        item_delays: Mutex<HashMap<ItemId, Duration>>,
        fail_popular: AtomicBool,
        fail_categories: AtomicBool,
        search_results: Mutex<HashMap<String, CatalogResult<Vec<Item>>>>,
        search_delays: Mutex<HashMap<String, Duration>>,
        popular_requests: Mutex<Vec<u32>>,
        search_requests: Mutex<Vec<String>>,
        item_requests: AtomicUsize,
        category_requests: AtomicUsize,
    }

    impl MockCatalogClient {
        /// Serves the six fixture items as page 1 and generated items for later pages.
        pub fn new() -> Self {
            Self {
                categories: fixtures::categories(),
                items: fixtures::catalog()
                    .into_iter()
                    .map(|item| (item.id, item))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn fail_item(&self, id: ItemId) {
            self.failing_items.lock().unwrap().insert(id);
        }

        pub fn delay_item(&self, id: ItemId, delay: Duration) {
            self.item_delays.lock().unwrap().insert(id, delay);
        }

        pub fn set_fail_popular(&self, fail: bool) {
            self.fail_popular.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_categories(&self, fail: bool) {
            self.fail_categories.store(fail, Ordering::SeqCst);
        }

        pub fn set_search_result(&self, query: &str, result: CatalogResult<Vec<Item>>) {
            self.search_results
                .lock()
                .unwrap()
                .insert(query.to_string(), result);
        }

        pub fn delay_search(&self, query: &str, delay: Duration) {
            self.search_delays
                .lock()
                .unwrap()
                .insert(query.to_string(), delay);
        }

        pub fn popular_requests(&self) -> Vec<u32> {
            self.popular_requests.lock().unwrap().clone()
        }

        pub fn search_requests(&self) -> Vec<String> {
            self.search_requests.lock().unwrap().clone()
        }

        pub fn item_request_count(&self) -> usize {
            self.item_requests.load(Ordering::SeqCst)
        }

        pub fn category_request_count(&self) -> usize {
            self.category_requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogClient for MockCatalogClient {
        async fn fetch_categories(&self) -> CatalogResult<CategoryDictionary> {
            self.category_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail_categories.load(Ordering::SeqCst) {
                return Err(CatalogError::Transport("mock categories failure".into()));
            }
            Ok(self.categories.clone())
        }

        async fn fetch_popular(&self, page: u32) -> CatalogResult<Vec<Item>> {
            self.popular_requests.lock().unwrap().push(page);
            if self.fail_popular.load(Ordering::SeqCst) {
                return Err(CatalogError::from_status(500, "mock popular failure".into()));
            }
            if page == 1 {
                Ok(fixtures::catalog())
            } else {
                Ok(fixtures::generated_page(page))
            }
        }

        async fn fetch_item(&self, id: ItemId) -> CatalogResult<Item> {
            self.item_requests.fetch_add(1, Ordering::SeqCst);
            let delay = self.item_delays.lock().unwrap().get(&id).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing_items.lock().unwrap().contains(&id) {
                return Err(CatalogError::Transport(format!("mock failure for {}", id)));
            }
            self.items
                .get(&id)
                .cloned()
                .ok_or_else(|| CatalogError::from_status(404, format!("no item {}", id)))
        }

        async fn search_items(&self, query: &str) -> CatalogResult<Vec<Item>> {
            self.search_requests.lock().unwrap().push(query.to_string());
            let delay = self.search_delays.lock().unwrap().get(query).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(result) = self.search_results.lock().unwrap().get(query) {
                return result.clone();
            }
            let needle = query.to_lowercase();
            Ok(fixtures::catalog()
                .into_iter()
                .filter(|item| item.title.to_lowercase().contains(&needle))
                .collect())
        }
    }
}

/// Hub wiring shared by the service and controller tests
pub mod hub {
    use std::sync::Arc;

    use super::mock_catalog::MockCatalogClient;
    use crate::models::ItemId;
    use crate::services::data_hub::DataHub;
    use crate::services::favorites::InMemoryFavoriteStore;

    pub struct TestHub {
        pub client: Arc<MockCatalogClient>,
        pub store: Arc<InMemoryFavoriteStore>,
        pub hub: Arc<DataHub>,
    }

    pub fn create_test_hub(favorite_ids: impl IntoIterator<Item = ItemId>) -> TestHub {
        create_test_hub_with(MockCatalogClient::new(), favorite_ids)
    }

    pub fn create_test_hub_with(
        client: MockCatalogClient,
        favorite_ids: impl IntoIterator<Item = ItemId>,
    ) -> TestHub {
        let client = Arc::new(client);
        let store = Arc::new(InMemoryFavoriteStore::with_ids(favorite_ids));
        let hub = Arc::new(DataHub::new(client.clone(), store.clone()));
        TestHub { client, store, hub }
    }
}
