pub mod catalog_list_view_model;
pub mod favorite_list_view_model;
pub mod filter_editor_view_model;
pub mod filters;
pub mod item_view_models;
pub mod list_state;
pub mod property;

pub use catalog_list_view_model::CatalogListViewModel;
pub use favorite_list_view_model::FavoriteListViewModel;
pub use filter_editor_view_model::FilterEditor;
pub use filters::{Filter, FilterChainMode};
pub use item_view_models::{ItemCellViewModel, ItemDetailViewModel};
pub use list_state::{ItemCountSubscriber, ListIntent, ListOutput, ListSettings, PresentationState};
pub use property::{ComputedProperty, Property, PropertySubscriber};

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::Item;
use crate::services::data_hub::DataHub;

/// Behaviour shared by the catalog and favorites lists.
///
/// Index-based calls never fail: an out-of-range index yields `None` or does nothing.
#[async_trait::async_trait]
pub trait ListViewModel: Send + Sync {
    fn hub(&self) -> &Arc<DataHub>;

    fn output(&self) -> &ListOutput;

    fn settings(&self) -> &ListSettings;

    /// Subscribe to the hub and seed from its current state.
    fn start(&self);

    /// Drive searching from `query`, throttled and de-duplicated.
    fn bind_query(&self, query: &Property<Option<String>>);

    /// Re-issue the fetches behind this list.
    async fn refresh(&self);

    fn items(&self) -> Arc<Vec<Item>> {
        self.output().items()
    }

    fn item_count(&self) -> usize {
        self.output().item_count()
    }

    fn presentation_state(&self) -> PresentationState {
        self.output().presentation_state()
    }

    fn subscribe_state(&self) -> PropertySubscriber<PresentationState> {
        self.output().subscribe_state()
    }

    fn subscribe_item_count(&self) -> ItemCountSubscriber {
        self.output().subscribe_item_count()
    }

    fn subscribe_intents(&self) -> broadcast::Receiver<ListIntent> {
        self.output().subscribe_intents()
    }

    fn view_model_for_item(&self, index: usize) -> Option<ItemCellViewModel> {
        self.output()
            .item_at(index)
            .map(|item| ItemCellViewModel::new(&item, &self.settings().image_base_url))
    }

    fn view_model_for_item_detail(&self, index: usize) -> Option<ItemDetailViewModel> {
        self.output().item_at(index).map(|item| {
            ItemDetailViewModel::new(item, Arc::clone(self.hub()), &self.settings().image_base_url)
        })
    }

    /// Ask the router to open the detail screen for the item at `index`.
    fn select_item(&self, index: usize) {
        if let Some(item) = self.output().item_at(index) {
            self.output().emit(ListIntent::ShowDetail(item.id));
        }
    }

    fn toggle_favorite(&self, index: usize) {
        match self.output().item_at(index) {
            Some(item) => self.hub().toggle_favorite(item.id),
            None => debug!("Ignoring favorite toggle for index {} past the list end", index),
        }
    }
}
