use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use super::filters::FilterChainMode;
use super::property::{Property, PropertySubscriber};
use crate::config::Config;
use crate::constants::{
    DEFAULT_IMAGE_BASE_URL, DEFAULT_QUERY_THROTTLE_MS, DEFAULT_SEARCH_RESULT_LIMIT,
};
use crate::models::{Item, ItemId};
use crate::utils::TaskGuard;

/// What the display layer should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Loading,
    ShowingItems,
    ShowingFilteredItems,
    NoMatches,
    Error,
}

/// State for a successfully loaded list.
///
/// An empty result over a non-empty source is a miss. Otherwise the list is
/// filtered when any filter has a selection.
pub fn derive_state(displayed: &[Item], source: &[Item], filtering: bool) -> PresentationState {
    if displayed.is_empty() && !source.is_empty() {
        PresentationState::NoMatches
    } else if filtering {
        PresentationState::ShowingFilteredItems
    } else {
        PresentationState::ShowingItems
    }
}

/// Navigation requests for whoever routes between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListIntent {
    ShowDetail(ItemId),
    ShowFilters,
}

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub query_throttle: Duration,
    pub search_result_limit: usize,
    pub filter_chain: FilterChainMode,
    pub image_base_url: String,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            query_throttle: Duration::from_millis(DEFAULT_QUERY_THROTTLE_MS),
            search_result_limit: DEFAULT_SEARCH_RESULT_LIMIT,
            filter_chain: FilterChainMode::default(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

impl From<&Config> for ListSettings {
    fn from(config: &Config) -> Self {
        Self {
            query_throttle: config.lists.query_throttle(),
            search_result_limit: config.lists.search_result_limit,
            filter_chain: config.lists.filter_chain,
            image_base_url: config.api.image_base_url.clone(),
        }
    }
}

/// The displayed sequence, its presentation state, and outgoing intents.
///
/// The item count is read from the displayed sequence itself, so the two can
/// never disagree.
pub struct ListOutput {
    display: Property<Arc<Vec<Item>>>,
    state: Property<PresentationState>,
    intents: broadcast::Sender<ListIntent>,
}

impl ListOutput {
    pub fn new(name: &str) -> Self {
        let (intents, _) = broadcast::channel(32);
        Self {
            display: Property::new(Arc::new(Vec::new()), format!("{}.display", name)),
            state: Property::new(PresentationState::Loading, format!("{}.state", name)),
            intents,
        }
    }

    pub fn items(&self) -> Arc<Vec<Item>> {
        self.display.get()
    }

    pub fn item_count(&self) -> usize {
        self.display.with(|items| items.len())
    }

    pub fn item_at(&self, index: usize) -> Option<Item> {
        self.display.with(|items| items.get(index).cloned())
    }

    pub fn presentation_state(&self) -> PresentationState {
        self.state.get()
    }

    /// Replace the displayed sequence, then announce the matching state.
    pub fn publish(&self, items: Vec<Item>, state: PresentationState) {
        debug!(
            list = self.display.name(),
            count = items.len(),
            ?state,
            "Publishing list"
        );
        self.display.set(Arc::new(items));
        self.state.set_if_changed(state);
    }

    pub fn set_state(&self, state: PresentationState) {
        self.state.set_if_changed(state);
    }

    pub fn subscribe_state(&self) -> PropertySubscriber<PresentationState> {
        self.state.subscribe()
    }

    pub fn subscribe_items(&self) -> PropertySubscriber<Arc<Vec<Item>>> {
        self.display.subscribe()
    }

    pub fn subscribe_item_count(&self) -> ItemCountSubscriber {
        ItemCountSubscriber {
            inner: self.display.subscribe(),
        }
    }

    pub fn emit(&self, intent: ListIntent) {
        debug!(?intent, "Emitting list intent");
        let _ = self.intents.send(intent);
    }

    pub fn subscribe_intents(&self) -> broadcast::Receiver<ListIntent> {
        self.intents.subscribe()
    }
}

/// Yields the length of every displayed sequence as it is published.
pub struct ItemCountSubscriber {
    inner: PropertySubscriber<Arc<Vec<Item>>>,
}

impl ItemCountSubscriber {
    pub async fn next(&mut self) -> Option<usize> {
        self.inner.next().await.map(|items| items.len())
    }
}

/// Blank or whitespace-only queries mean "no query".
pub fn normalize_query(query: Option<String>) -> Option<String> {
    query.filter(|q| !q.trim().is_empty())
}

/// Feed `query` through throttle, normalization and duplicate suppression into `apply`.
pub(crate) fn spawn_query_binding<F, Fut>(
    query: &Property<Option<String>>,
    interval: Duration,
    apply: F,
) -> TaskGuard
where
    F: Fn(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let pipeline = query.throttle(interval).map(normalize_query).distinct();
    let mut queries = pipeline.subscribe();

    TaskGuard::spawn(async move {
        let _pipeline = pipeline;
        while let Some(query) = queries.next().await {
            debug!(?query, "Query changed");
            apply(query).await;
        }
    })
}
