use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::types::{GenreListResponse, ItemDto, ItemPageResponse};
use crate::utils::{CatalogError, CatalogResult};

/// Catalog API resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Genres,
    Popular,
    Item(i64),
    Search,
}

impl Endpoint {
    fn segments(&self) -> Vec<String> {
        match self {
            Endpoint::Genres => vec!["genre".into(), "movie".into(), "list".into()],
            Endpoint::Popular => vec!["movie".into(), "popular".into()],
            Endpoint::Item(id) => vec!["movie".into(), id.to_string()],
            Endpoint::Search => vec!["search".into(), "movie".into()],
        }
    }
}

#[derive(Clone)]
pub struct TmdbApi {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    language: Option<String>,
}

impl std::fmt::Debug for TmdbApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbApi")
            .field("base_url", &self.base_url.as_str())
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbApi {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::from_reqwest)?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            language: None,
        })
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    pub(super) fn build_url(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> CatalogResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.api_key);
            if let Some(language) = &self.language {
                query.append_pair("language", language);
            }
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GET `url` and decode its JSON body.
    ///
    /// Only the path is logged; the query carries the API key.
    pub(super) async fn execute_get<T: DeserializeOwned>(
        &self,
        url: Url,
        operation_name: &str,
    ) -> CatalogResult<T> {
        debug!("[{}] GET {}", operation_name, url.path());

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        let status = response.status();
        debug!("[{}] Response: {}", operation_name, status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            warn!(
                "[{}] Error response - Status: {}, Body: {}",
                operation_name,
                status.as_u16(),
                body
            );
            return Err(CatalogError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(CatalogError::from_reqwest)?;
        if bytes.is_empty() {
            warn!("[{}] Empty response body", operation_name);
            return Err(CatalogError::EmptyBody);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("[{}] Failed to decode response: {}", operation_name, e);
            CatalogError::Decode(format!("{}: {}", operation_name, e))
        })
    }

    pub async fn get_genres(&self) -> CatalogResult<GenreListResponse> {
        let url = self.build_url(Endpoint::Genres, &[])?;
        self.execute_get(url, "get_genres").await
    }

    pub async fn get_popular(&self, page: u32) -> CatalogResult<ItemPageResponse> {
        let page = page.to_string();
        let url = self.build_url(Endpoint::Popular, &[("page", &page)])?;
        self.execute_get(url, "get_popular").await
    }

    pub async fn get_item(&self, id: i64) -> CatalogResult<ItemDto> {
        let url = self.build_url(Endpoint::Item(id), &[])?;
        self.execute_get(url, "get_item").await
    }

    pub async fn search(&self, query: &str) -> CatalogResult<ItemPageResponse> {
        let url = self.build_url(Endpoint::Search, &[("query", query)])?;
        self.execute_get(url, "search").await
    }
}
