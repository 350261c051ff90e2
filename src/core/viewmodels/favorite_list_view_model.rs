use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::filter_editor_view_model::FilterEditor;
use super::filters::{Filter, build_filters, compose_filters, is_filtering, search_by_title};
use super::list_state::{
    ListIntent, ListOutput, ListSettings, PresentationState, derive_state, normalize_query,
    spawn_query_binding,
};
use super::property::{Property, PropertySubscriber};
use super::ListViewModel;
use crate::models::{CategoryDictionary, Item};
use crate::services::data_hub::{DataHub, Publication};
use crate::utils::TaskGuard;
use crate::utils::collections::sort_by_title;

/// Favorites with local title search and release-year/category filters.
pub struct FavoriteListViewModel {
    inner: Arc<FavoriteInner>,
    tasks: std::sync::Mutex<Vec<TaskGuard>>,
}

struct FavoriteInner {
    hub: Arc<DataHub>,
    settings: ListSettings,
    output: ListOutput,
    filters: Property<Arc<Vec<Filter>>>,
    state: Mutex<FavoriteState>,
}

#[derive(Debug, Default)]
struct FavoriteState {
    source: Arc<Vec<Item>>,
    query: Option<String>,
    last_revision: u64,
    upstream_error: bool,
}

impl FavoriteListViewModel {
    pub fn new(hub: Arc<DataHub>, settings: ListSettings) -> Self {
        Self {
            inner: Arc::new(FavoriteInner {
                hub,
                settings,
                output: ListOutput::new("favorite_list"),
                filters: Property::new(Arc::new(Vec::new()), "favorite_filters"),
                state: Mutex::new(FavoriteState::default()),
            }),
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn keep(&self, task: TaskGuard) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
    }

    pub fn filters(&self) -> Arc<Vec<Filter>> {
        self.inner.filters.get()
    }

    pub fn subscribe_filters(&self) -> PropertySubscriber<Arc<Vec<Filter>>> {
        self.inner.filters.subscribe()
    }

    /// Filter the favorites by title. `None` or a blank query shows all of them.
    pub async fn search(&self, query: Option<String>) {
        let mut state = self.inner.state.lock().await;
        state.query = normalize_query(query);
        self.inner.recompute(&state);
    }

    /// Replace the selection of the filter at `filter_index`. Out-of-range indices are ignored.
    pub async fn set_filter_selection(
        &self,
        filter_index: usize,
        indices: impl IntoIterator<Item = usize>,
    ) {
        let state = self.inner.state.lock().await;
        if filter_index >= self.inner.filters.with(|f| f.len()) {
            debug!("Ignoring selection for missing filter {}", filter_index);
            return;
        }
        self.inner.filters.update(|filters| {
            Arc::make_mut(filters)[filter_index].set_selected(indices);
        });
        self.inner.recompute(&state);
    }

    pub async fn remove_all_filter_selections(&self) {
        let state = self.inner.state.lock().await;
        self.inner.filters.update(|filters| {
            Arc::make_mut(filters)
                .iter_mut()
                .for_each(Filter::clear_selection);
        });
        info!("Cleared all filter selections");
        self.inner.recompute(&state);
    }

    /// Blank working copies of the current filters for the filter screen.
    pub fn filter_editor(&self) -> FilterEditor {
        FilterEditor::new(&self.inner.filters.get())
    }

    /// Ask the router to open the filter screen.
    pub fn show_filters(&self) {
        self.inner.output.emit(ListIntent::ShowFilters);
    }

    /// Take over the selections made in `editor` and re-derive the list.
    ///
    /// Selections are matched by filter and option label, so an editor opened
    /// before the favorites changed still applies to the options that remain.
    pub async fn apply_filters(&self, editor: FilterEditor) {
        let state = self.inner.state.lock().await;
        let edited = editor.into_filters();
        self.inner.filters.update(|filters| {
            for filter in Arc::make_mut(filters).iter_mut() {
                match edited.iter().find(|e| e.label() == filter.label()) {
                    Some(source) => carry_selection(filter, source),
                    None => filter.clear_selection(),
                }
            }
        });
        info!("Applied filters from editor");
        self.inner.recompute(&state);
    }
}

/// Select in `target` every option that is selected in `source`, by label.
fn carry_selection(target: &mut Filter, source: &Filter) {
    let selected: Vec<usize> = source
        .selected_options()
        .filter_map(|label| target.options().iter().position(|o| o == label))
        .collect();
    target.set_selected(selected);
}

impl FavoriteInner {
    async fn apply_favorites(&self, publication: Publication) {
        let mut state = self.state.lock().await;
        if publication.revision <= state.last_revision {
            return;
        }
        state.last_revision = publication.revision;

        match publication.error {
            Some(e) => {
                warn!("Favorites update failed: {}", e);
                state.upstream_error = true;
                state.source = Arc::new(Vec::new());
            }
            None => {
                state.upstream_error = false;
                state.source = publication.items;
                let filters = build_filters(&state.source, self.hub.categories());
                debug!("Rebuilt filters for {} favorites", state.source.len());
                self.filters.set(Arc::new(filters));
            }
        }
        self.recompute(&state);
    }

    /// New category names change the category options; selections survive by label.
    async fn apply_categories(&self, dictionary: Arc<CategoryDictionary>) {
        let state = self.state.lock().await;
        if state.last_revision == 0 {
            return;
        }
        let previous = self.filters.get();
        let mut filters = build_filters(&state.source, dictionary);
        for filter in filters.iter_mut() {
            if let Some(old) = previous.iter().find(|f| f.label() == filter.label()) {
                carry_selection(filter, old);
            }
        }
        self.filters.set(Arc::new(filters));
        self.recompute(&state);
    }

    fn recompute(&self, state: &FavoriteState) {
        if state.last_revision == 0 {
            return;
        }
        if state.upstream_error {
            self.output.publish(Vec::new(), PresentationState::Error);
            return;
        }

        let filters = self.filters.get();
        let query = state.query.as_deref().unwrap_or("");
        let searched = search_by_title(&state.source, query);
        let mut displayed = compose_filters(&searched, &filters, self.settings.filter_chain);
        sort_by_title(&mut displayed);

        let presentation = derive_state(&displayed, &state.source, is_filtering(&filters));
        self.output.publish(displayed, presentation);
    }
}

#[async_trait::async_trait]
impl ListViewModel for FavoriteListViewModel {
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
        let mut favorites = inner.hub.subscribe_favorites();
        let mut categories = inner.hub.subscribe_categories();

        self.keep(TaskGuard::spawn(async move {
            let current = inner.hub.favorite_items();
            if !current.is_initial() {
                inner.apply_favorites(current).await;
            }
            loop {
                tokio::select! {
                    publication = favorites.next() => match publication {
                        Some(publication) => inner.apply_favorites(publication).await,
                        None => break,
                    },
                    dictionary = categories.next() => match dictionary {
                        Some(dictionary) => inner.apply_categories(dictionary).await,
                        None => break,
                    },
                }
            }
            debug!("Hub closed, favorite list listener stopping");
        }));
    }

    fn bind_query(&self, query: &Property<Option<String>>) {
        let inner = Arc::clone(&self.inner);
        let interval = inner.settings.query_throttle;
        self.keep(spawn_query_binding(query, interval, move |query| {
            let inner = Arc::clone(&inner);
            async move {
                let mut state = inner.state.lock().await;
                state.query = query;
                inner.recompute(&state);
            }
        }));
    }

    /// Refetch favorites, and the categories too when none are loaded yet.
    async fn refresh(&self) {
        info!("Refreshing favorites");
        if self.inner.hub.categories().is_empty() {
            self.inner.hub.fetch_categories().await;
        }
        self.inner.hub.fetch_favorites().await;
    }
}
