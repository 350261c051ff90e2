use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::list_state::{
    ListOutput, ListSettings, PresentationState, derive_state, normalize_query,
    spawn_query_binding,
};
use super::property::Property;
use super::ListViewModel;
use crate::models::Item;
use crate::services::data_hub::{DataHub, Publication};
use crate::utils::collections::dedup_by_id;
use crate::utils::{CatalogError, TaskGuard};

/// Paginated popular listing with remote search.
pub struct CatalogListViewModel {
    inner: Arc<CatalogInner>,
    tasks: std::sync::Mutex<Vec<TaskGuard>>,
}

struct CatalogInner {
    hub: Arc<DataHub>,
    settings: ListSettings,
    output: ListOutput,
    state: Mutex<CatalogState>,
    search_seq: AtomicU64,
}

#[derive(Debug, Default)]
struct CatalogState {
    accumulated: Vec<Item>,
    last_revision: u64,
    loaded_pages: u32,
    page_in_flight: bool,
    searching: bool,
    upstream_error: Option<CatalogError>,
}

impl CatalogState {
    fn catalog_presentation(&self) -> PresentationState {
        if self.upstream_error.is_some() {
            PresentationState::Error
        } else if self.last_revision == 0 || (self.page_in_flight && self.accumulated.is_empty()) {
            PresentationState::Loading
        } else {
            derive_state(&self.accumulated, &self.accumulated, false)
        }
    }
}

impl CatalogListViewModel {
    pub fn new(hub: Arc<DataHub>, settings: ListSettings) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                hub,
                settings,
                output: ListOutput::new("catalog_list"),
                state: Mutex::new(CatalogState::default()),
                search_seq: AtomicU64::new(0),
            }),
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn keep(&self, task: TaskGuard) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
    }

    /// Call when the presentation layer is about to show `index`.
    ///
    /// Reaching the last item requests the next page, once, unless searching.
    pub async fn will_display_item(&self, index: usize) {
        let next_page = {
            let mut state = self.inner.state.lock().await;
            if state.searching || state.page_in_flight {
                return;
            }
            if index + 1 != self.inner.output.item_count() {
                return;
            }
            state.page_in_flight = true;
            state.loaded_pages + 1
        };

        info!("Reached end of catalog list, requesting page {}", next_page);
        self.inner.hub.fetch_catalog_page(next_page).await;
    }

    /// Search remotely for `query`, or restore the catalog when it is `None` or blank.
    pub async fn search(&self, query: Option<String>) {
        self.inner.search(query).await;
    }

    pub async fn is_searching(&self) -> bool {
        self.inner.state.lock().await.searching
    }

    pub async fn loaded_pages(&self) -> u32 {
        self.inner.state.lock().await.loaded_pages
    }
}

impl CatalogInner {
    async fn apply_catalog(&self, publication: Publication) {
        let mut state = self.state.lock().await;
        if publication.revision <= state.last_revision {
            return;
        }
        state.last_revision = publication.revision;
        state.page_in_flight = false;

        match publication.error {
            Some(e) => {
                warn!("Catalog update failed: {}", e);
                state.upstream_error = Some(e);
            }
            None => {
                state.upstream_error = None;
                state.loaded_pages += 1;
                let mut accumulated = std::mem::take(&mut state.accumulated);
                accumulated.extend(publication.items.iter().cloned());
                state.accumulated = dedup_by_id(accumulated);
                debug!(
                    "Catalog now holds {} items over {} pages",
                    state.accumulated.len(),
                    state.loaded_pages
                );
            }
        }

        if state.searching {
            debug!("Search active, catalog update kept for later");
            return;
        }
        self.output
            .publish(state.accumulated.clone(), state.catalog_presentation());
    }

    async fn search(&self, query: Option<String>) {
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(query) = normalize_query(query) else {
            let mut state = self.state.lock().await;
            if state.searching {
                debug!("Search cleared, restoring {} catalog items", state.accumulated.len());
                state.searching = false;
                self.output
                    .publish(state.accumulated.clone(), state.catalog_presentation());
            }
            return;
        };

        {
            let mut state = self.state.lock().await;
            state.searching = true;
            self.output.set_state(PresentationState::Loading);
        }

        let result = self.hub.search_items(&query).await;

        let state = self.state.lock().await;
        if self.search_seq.load(Ordering::SeqCst) != seq || !state.searching {
            debug!("Discarding stale results for {:?}", query);
            return;
        }

        match result {
            Ok(mut items) => {
                items.truncate(self.settings.search_result_limit);
                info!("Search {:?} matched {} items", query, items.len());
                let presentation = if items.is_empty() {
                    PresentationState::NoMatches
                } else {
                    PresentationState::ShowingItems
                };
                self.output.publish(items, presentation);
            }
            Err(e) => {
                warn!("Search {:?} failed: {}", query, e);
                self.output.publish(Vec::new(), PresentationState::Error);
            }
        }
    }
}

#[async_trait::async_trait]
impl ListViewModel for CatalogListViewModel {
    fn hub(&self) -> &Arc<DataHub> {
        &self.inner.hub
    }

    fn output(&self) -> &ListOutput {
        &self.inner.output
    }

    fn settings(&self) -> &ListSettings {
        &self.inner.settings
    }

    fn start(&self) {
        let inner = Arc::clone(&self.inner);
        let mut publications = inner.hub.subscribe_catalog();

        self.keep(TaskGuard::spawn(async move {
            let current = inner.hub.catalog();
            if !current.is_initial() {
                inner.apply_catalog(current).await;
            }
            while let Some(publication) = publications.next().await {
                inner.apply_catalog(publication).await;
            }
        }));
    }

    fn bind_query(&self, query: &Property<Option<String>>) {
        let inner = Arc::clone(&self.inner);
        let interval = inner.settings.query_throttle;
        self.keep(spawn_query_binding(query, interval, move |query| {
            let inner = Arc::clone(&inner);
            async move { inner.search(query).await }
        }));
    }

    /// Drop every loaded page and start over from page 1.
    async fn refresh(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.accumulated.clear();
            state.loaded_pages = 0;
            state.page_in_flight = true;
            state.upstream_error = None;
            if !state.searching {
                self.inner
                    .output
                    .publish(Vec::new(), PresentationState::Loading);
            }
        }
        info!("Refreshing catalog");
        self.inner.hub.fetch_catalog_page(1).await;
    }
}
