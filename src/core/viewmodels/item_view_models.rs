use std::sync::Arc;

use crate::constants::UPCOMING_LABEL;
use crate::models::{CategoryDictionary, Item, ItemId};
use crate::services::data_hub::DataHub;

/// Row/cell content for one list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCellViewModel {
    pub id: ItemId,
    pub title: String,
    pub year_label: String,
    pub summary: String,
    pub poster_url: Option<String>,
}

impl ItemCellViewModel {
    pub fn new(item: &Item, image_base_url: &str) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            year_label: item.release_year_label(),
            summary: item.summary.clone(),
            poster_url: item.poster_url(image_base_url),
        }
    }
}

/// Detail screen content. Favorite state is read live from the hub.
pub struct ItemDetailViewModel {
    item: Item,
    categories: Arc<CategoryDictionary>,
    image_base_url: String,
    hub: Arc<DataHub>,
}

impl ItemDetailViewModel {
    pub fn new(item: Item, hub: Arc<DataHub>, image_base_url: &str) -> Self {
        Self {
            categories: hub.categories(),
            item,
            image_base_url: image_base_url.to_string(),
            hub,
        }
    }

    pub fn item_id(&self) -> ItemId {
        self.item.id
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }

    pub fn summary(&self) -> &str {
        &self.item.summary
    }

    /// e.g. "Dec, 2010"
    pub fn date_label(&self) -> String {
        match self.item.release_date {
            Some(date) => date.format("%b, %Y").to_string(),
            None => UPCOMING_LABEL.to_string(),
        }
    }

    pub fn categories_text(&self) -> String {
        self.categories
            .names_for(self.item.category_ids())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn poster_url(&self) -> Option<String> {
        self.item.poster_url(&self.image_base_url)
    }

    pub fn is_favorite(&self) -> bool {
        self.hub.is_favorite(self.item.id)
    }

    pub fn toggle_favorite(&self) {
        self.hub.toggle_favorite(self.item.id);
    }
}

impl std::fmt::Debug for ItemDetailViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemDetailViewModel")
            .field("item", &self.item.id)
            .field("title", &self.item.title)
            .finish()
    }
}
