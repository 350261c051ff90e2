mod api;
mod types;


pub use api::{Endpoint, TmdbApi};

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::traits::CatalogClient;
use crate::config::ApiConfig;
use crate::models::{CategoryDictionary, Item, ItemId};
use crate::utils::CatalogResult;

/// Catalog client backed by The Movie Database HTTP API.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api: TmdbApi,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        Ok(Self {
            api: TmdbApi::new(base_url, api_key, timeout)?,
        })
    }

    pub fn from_config(config: &ApiConfig) -> CatalogResult<Self> {
        let api = TmdbApi::new(&config.base_url, config.api_key.clone(), config.timeout())?
            .with_language(config.language.clone());
        Ok(Self { api })
    }
}

#[async_trait]
impl CatalogClient for TmdbClient {
    async fn fetch_categories(&self) -> CatalogResult<CategoryDictionary> {
        let dictionary = CategoryDictionary::from(self.api.get_genres().await?);
        info!("Fetched {} categories", dictionary.len());
        Ok(dictionary)
    }

    async fn fetch_popular(&self, page: u32) -> CatalogResult<Vec<Item>> {
        let response = self.api.get_popular(page).await?;
        debug!(
            "Fetched popular page {} ({} items, {:?} pages total)",
            response.page,
            response.results.len(),
            response.total_pages
        );
        Ok(response.results.into_iter().map(Item::from).collect())
    }

    async fn fetch_item(&self, id: ItemId) -> CatalogResult<Item> {
        Ok(Item::from(self.api.get_item(id.get()).await?))
    }

    async fn search_items(&self, query: &str) -> CatalogResult<Vec<Item>> {
        let response = self.api.search(query).await?;
        debug!("Search matched {} items", response.results.len());
        Ok(response.results.into_iter().map(Item::from).collect())
    }
}
