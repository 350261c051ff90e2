use async_trait::async_trait;

use crate::models::{CategoryDictionary, Item, ItemId};
use crate::utils::CatalogResult;

/// Remote source of catalog data.
#[async_trait]
pub trait CatalogClient: Send + Sync + std::fmt::Debug {
    async fn fetch_categories(&self) -> CatalogResult<CategoryDictionary>;

    /// One page of the popular listing. Pages are numbered from 1.
    async fn fetch_popular(&self, page: u32) -> CatalogResult<Vec<Item>>;

    async fn fetch_item(&self, id: ItemId) -> CatalogResult<Item>;

    async fn search_items(&self, query: &str) -> CatalogResult<Vec<Item>>;
}
