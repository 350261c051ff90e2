pub mod data_hub;
pub mod favorites;

pub use data_hub::{DataHub, Publication};
pub use favorites::{FavoriteStore, InMemoryFavoriteStore};
