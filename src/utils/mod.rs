pub mod collections;
pub mod errors;
pub mod tasks;

pub use errors::{CatalogError, CatalogResult};
pub use tasks::TaskGuard;
