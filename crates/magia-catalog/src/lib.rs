pub mod browse;
pub mod catalog;
pub mod client;
pub mod error;
pub mod fallback;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use browse::{browse, BrowseQuery, CategoryFilter, PriceRange, SortOrder};
pub use catalog::{Catalog, CatalogPage, CatalogSource, CategoryPage};
pub use client::CatalogClient;
pub use error::CatalogError;
pub use fallback::FallbackCatalog;
pub use normalize::normalize_product;
pub use types::{CategoryRow, ProductRow};
