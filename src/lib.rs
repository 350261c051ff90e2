pub mod backends;
pub mod config;
pub mod constants;
pub mod core;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use backends::{CatalogClient, TmdbClient};
pub use config::Config;
pub use crate::core::viewmodels::{
    CatalogListViewModel, FavoriteListViewModel, FilterEditor, ListIntent, ListSettings,
    ListViewModel, PresentationState,
};
pub use models::{CategoryDictionary, CategoryId, Item, ItemId};
pub use services::{DataHub, FavoriteStore, InMemoryFavoriteStore};
pub use utils::{CatalogError, CatalogResult};
