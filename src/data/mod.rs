pub mod catalog;
pub mod villager;

pub use catalog::{Catalog, CatalogError, SpeciesSummary};
pub use villager::{Villager, DEFAULT_CATALOG_PATH};
