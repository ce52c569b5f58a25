pub mod errors;
pub mod satellite;
pub mod store;

pub use errors::CatalogError;
pub use satellite::{filter_catalog, name_matches, SatelliteEntry};
pub use store::{CachePolicy, FileCache, TleStore};
