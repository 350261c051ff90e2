use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::backends::traits::CatalogClient;
use crate::core::viewmodels::property::{Property, PropertySubscriber};
use crate::models::{CategoryDictionary, Item, ItemId};
use crate::services::favorites::FavoriteStore;
use crate::utils::{CatalogError, CatalogResult, TaskGuard};

/// One published `(items, error)` state of a hub collection.
///
/// `revision` increases by one with every publication of the same collection,
/// so observers can tell a new publication from one they already applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Publication {
    pub revision: u64,
    pub items: Arc<Vec<Item>>,
    pub error: Option<CatalogError>,
}

impl Publication {
    /// Nothing has been fetched yet.
    pub fn is_initial(&self) -> bool {
        self.revision == 0
    }

    fn advance(&mut self, items: Vec<Item>, error: Option<CatalogError>) {
        self.revision += 1;
        self.items = Arc::new(items);
        self.error = error;
    }
}

/// Owns the authoritative catalog and favorites state and drives every fetch.
///
/// Constructed once and shared by `Arc` with the controllers that observe it.
pub struct DataHub {
    client: Arc<dyn CatalogClient>,
    favorites: Arc<dyn FavoriteStore>,
    categories: Property<Arc<CategoryDictionary>>,
    catalog: Property<Publication>,
    favorite_items: Property<Publication>,
    favorites_round: AtomicU64,
}

impl std::fmt::Debug for DataHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataHub")
            .field("client", &self.client)
            .field("favorites", &self.favorites)
            .field("catalog_revision", &self.catalog.with(|p| p.revision))
            .field("favorites_revision", &self.favorite_items.with(|p| p.revision))
            .finish()
    }
}

impl DataHub {
    pub fn new(client: Arc<dyn CatalogClient>, favorites: Arc<dyn FavoriteStore>) -> Self {
        Self {
            client,
            favorites,
            categories: Property::new(Arc::new(CategoryDictionary::default()), "categories"),
            catalog: Property::new(Publication::default(), "catalog"),
            favorite_items: Property::new(Publication::default(), "favorite_items"),
            favorites_round: AtomicU64::new(0),
        }
    }

    /// Initial load, then keep the favorites in step with the favorite store.
    ///
    /// The returned guard stops listening when dropped.
    pub fn start(self: &Arc<Self>) -> TaskGuard {
        let hub = Arc::clone(self);
        // Subscribe before the first fetch so no toggle is missed
        let mut changes = hub.favorites.subscribe();

        TaskGuard::spawn(async move {
            hub.fetch_categories().await;
            tokio::join!(hub.fetch_catalog_page(1), hub.fetch_favorites());

            while let Some(mut ids) = changes.next().await {
                // Collapse a burst of toggles into one reconciliation
                while let Some(newer) = changes.try_next() {
                    ids = newer;
                }
                debug!("Favorite ids changed ({} ids)", ids.len());
                hub.reconcile_favorites(ids).await;
            }
            debug!("Favorite store closed, hub listener stopping");
        })
    }

    /// Load the category dictionary. Failures keep the previous dictionary.
    pub async fn fetch_categories(&self) {
        match self.client.fetch_categories().await {
            Ok(dictionary) => {
                info!("Category dictionary loaded ({} entries)", dictionary.len());
                self.categories.set(Arc::new(dictionary));
            }
            Err(e) => {
                warn!("Failed to fetch categories, keeping previous dictionary: {}", e);
            }
        }
    }

    /// Fetch one popular page and publish it as the catalog state.
    pub async fn fetch_catalog_page(&self, page: u32) {
        debug!("Fetching catalog page {}", page);
        match self.client.fetch_popular(page).await {
            Ok(items) => {
                info!("Catalog page {} loaded ({} items)", page, items.len());
                self.catalog.update(|p| p.advance(items, None));
            }
            Err(e) => {
                warn!("Failed to fetch catalog page {}: {}", page, e);
                self.catalog.update(|p| p.advance(Vec::new(), Some(e)));
            }
        }
    }

    /// Resolve the current favorite ids into full items.
    pub async fn fetch_favorites(&self) {
        let ids = self.favorites.get_all();
        self.reconcile_favorites(ids).await;
    }

    /// Look every id up concurrently and publish the whole set at once.
    ///
    /// Any failed lookup publishes `(empty, error)`. A round that was overtaken
    /// by a newer one is dropped without publishing.
    async fn reconcile_favorites(&self, ids: BTreeSet<ItemId>) {
        let round = self.favorites_round.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Reconciling {} favorites (round {})", ids.len(), round);

        let lookups = ids.iter().map(|id| self.client.fetch_item(*id));
        let outcome = try_join_all(lookups).await;

        let published = self.favorite_items.update_if(|p| {
            if self.favorites_round.load(Ordering::SeqCst) != round {
                return false;
            }
            match outcome {
                Ok(items) => p.advance(items, None),
                Err(e) => p.advance(Vec::new(), Some(e)),
            }
            true
        });

        if !published {
            debug!("Discarding favorites round {}, a newer round is in flight", round);
            return;
        }

        self.favorite_items.with(|p| match &p.error {
            Some(e) => warn!("Favorites round {} failed: {}", round, e),
            None => info!("Favorites round {} published {} items", round, p.items.len()),
        });
    }

    /// Ask the favorite store to flip `id`. The hub reacts to the store's notification.
    pub fn toggle_favorite(&self, id: ItemId) {
        debug!("Toggling favorite {}", id);
        self.favorites.toggle(id);
    }

    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.favorites.contains(id)
    }

    /// One-shot remote search. Hub state is untouched.
    pub async fn search_items(&self, query: &str) -> CatalogResult<Vec<Item>> {
        debug!("Searching catalog for {:?}", query);
        self.client.search_items(query).await
    }

    pub fn categories(&self) -> Arc<CategoryDictionary> {
        self.categories.get()
    }

    pub fn subscribe_categories(&self) -> PropertySubscriber<Arc<CategoryDictionary>> {
        self.categories.subscribe()
    }

    pub fn catalog(&self) -> Publication {
        self.catalog.get()
    }

    pub fn subscribe_catalog(&self) -> PropertySubscriber<Publication> {
        self.catalog.subscribe()
    }

    pub fn favorite_items(&self) -> Publication {
        self.favorite_items.get()
    }

    pub fn subscribe_favorites(&self) -> PropertySubscriber<Publication> {
        self.favorite_items.subscribe()
    }
}
