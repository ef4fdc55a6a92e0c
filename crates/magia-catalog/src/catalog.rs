use magia_core::{AppConfig, Product};

use crate::browse::{browse, BrowseQuery};
use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::fallback::FallbackCatalog;
use crate::normalize::normalize_rows;
use crate::types::CategoryRow;

/// Which data source answered a catalog read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Remote => write!(f, "remote"),
            CatalogSource::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub source: CatalogSource,
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub categories: Vec<CategoryRow>,
    pub source: CatalogSource,
}

/// Read-only catalog facade.
///
/// Reads go to the hosted catalog when one is configured. Any upstream
/// failure is logged and answered from the fallback list instead, so reads
/// never fail.
#[derive(Debug)]
pub struct Catalog {
    remote: Option<CatalogClient>,
    fallback: FallbackCatalog,
}

impl Catalog {
    #[must_use]
    pub fn new(remote: Option<CatalogClient>, fallback: FallbackCatalog) -> Self {
        Self { remote, fallback }
    }

    /// Builds the remote client (if configured) and the fallback list.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote base URL is invalid or the fallback
    /// catalog cannot be loaded.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let remote = CatalogClient::from_config(config)?;
        let fallback = FallbackCatalog::from_config(config)?;
        if remote.is_none() {
            tracing::info!("no remote catalog configured, serving fallback catalog");
        }
        Ok(Self::new(remote, fallback))
    }

    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Products in `category`, or the whole catalog.
    pub async fn products(&self, category: Option<&str>) -> CatalogPage {
        if let Some(client) = &self.remote {
            match client.fetch_products(category).await {
                Ok(rows) => {
                    return CatalogPage {
                        products: normalize_rows(rows),
                        source: CatalogSource::Remote,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?category, "remote catalog unavailable, using fallback");
                }
            }
        }
        CatalogPage {
            products: self.fallback.by_category(category),
            source: CatalogSource::Fallback,
        }
    }

    /// Category rows with a non-blank name.
    pub async fn categories(&self) -> CategoryPage {
        let (rows, source) = match &self.remote {
            Some(client) => match client.fetch_categories().await {
                Ok(rows) => (rows, CatalogSource::Remote),
                Err(e) => {
                    tracing::warn!(error = %e, "remote categories unavailable, using fallback");
                    (self.fallback.categories(), CatalogSource::Fallback)
                }
            },
            None => (self.fallback.categories(), CatalogSource::Fallback),
        };
        CategoryPage {
            categories: rows
                .into_iter()
                .filter(|r| r.category.as_deref().is_some_and(|c| !c.trim().is_empty()))
                .collect(),
            source,
        }
    }

    /// Fetches the slice `query` needs and applies it.
    pub async fn browse(&self, query: &BrowseQuery) -> CatalogPage {
        let page = self.products(query.category.remote_category()).await;
        CatalogPage {
            products: browse(&page.products, query),
            source: page.source,
        }
    }

    /// Looks up one product by id across the whole catalog.
    pub async fn find_product(&self, product_id: &str) -> Option<(Product, CatalogSource)> {
        let page = self.products(None).await;
        page.products
            .into_iter()
            .find(|p| p.id == product_id)
            .map(|p| (p, page.source))
    }
}
