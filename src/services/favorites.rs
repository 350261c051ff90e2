use std::collections::BTreeSet;
use tracing::debug;

use crate::core::viewmodels::property::{Property, PropertySubscriber};
use crate::models::ItemId;

/// Persistent set of favorite item ids.
///
/// Every change is published to subscribers with the full set after the change.
pub trait FavoriteStore: Send + Sync + std::fmt::Debug {
    fn get_all(&self) -> BTreeSet<ItemId>;

    /// Add `id` when absent, remove it when present.
    fn toggle(&self, id: ItemId);

    fn contains(&self, id: ItemId) -> bool {
        self.get_all().contains(&id)
    }

    fn subscribe(&self) -> PropertySubscriber<BTreeSet<ItemId>>;
}

#[derive(Debug)]
pub struct InMemoryFavoriteStore {
    ids: Property<BTreeSet<ItemId>>,
}

impl InMemoryFavoriteStore {
    pub fn new() -> Self {
        Self::with_ids(BTreeSet::new())
    }

    pub fn with_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            ids: Property::new(ids.into_iter().collect(), "favorite_ids"),
        }
    }
}

impl Default for InMemoryFavoriteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FavoriteStore for InMemoryFavoriteStore {
    fn get_all(&self) -> BTreeSet<ItemId> {
        self.ids.get()
    }

    fn toggle(&self, id: ItemId) {
        self.ids.update(|ids| {
            if !ids.remove(&id) {
                ids.insert(id);
            }
            debug!(item_id = %id, favorite = ids.contains(&id), count = ids.len(), "Favorite toggled");
        });
    }

    fn contains(&self, id: ItemId) -> bool {
        self.ids.with(|ids| ids.contains(&id))
    }

    fn subscribe(&self) -> PropertySubscriber<BTreeSet<ItemId>> {
        self.ids.subscribe()
    }
}
