use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;
use crate::types::{CategoryRow, ProductRow, CATEGORY_COLUMNS, PRODUCT_COLUMNS};

const PRODUCTS_VIEW: &str = "v_productos_publicos";
const CATEGORIES_VIEW: &str = "v_categorias";

/// HTTP client for the catalog's PostgREST views.
///
/// Every request carries the project's anon key twice, as `apikey` and as a
/// bearer token, which is what PostgREST behind Supabase expects for
/// anonymous reads. Transient failures (429, 5xx, timeouts) are retried with
/// exponential back-off up to `max_retries` additional attempts.
pub struct CatalogClient {
    client: Client,
    base_url: String,
    anon_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`CatalogError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CatalogError> {
        let parsed = Url::parse(base_url).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the optional remote section of the app config.
    ///
    /// Returns `Ok(None)` when no remote catalog is configured.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::new`].
    pub fn from_config(config: &magia_core::AppConfig) -> Result<Option<Self>, CatalogError> {
        config
            .remote_catalog
            .as_ref()
            .map(|remote| {
                Self::new(
                    &remote.url,
                    &remote.anon_key,
                    config.request_timeout_secs,
                    &config.user_agent,
                    config.max_retries,
                    config.retry_backoff_base_ms,
                )
            })
            .transpose()
    }

    /// Project base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches published products ordered by name, optionally restricted to
    /// one category.
    ///
    /// A blank `category` is treated as no filter.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`]: HTTP 429 after all retries.
    /// - [`CatalogError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`CatalogError::Http`]: network or TLS failure.
    /// - [`CatalogError::Deserialize`]: body is not the expected JSON array.
    pub async fn fetch_products(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ProductRow>, CatalogError> {
        let url = self.products_url(category)?;
        let rows: Vec<ProductRow> = self.get_json(url, "products").await?;
        tracing::debug!(count = rows.len(), ?category, "fetched catalog products");
        Ok(rows)
    }

    /// Fetches the category view ordered by name.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_products`].
    pub async fn fetch_categories(&self) -> Result<Vec<CategoryRow>, CatalogError> {
        let url = self.categories_url()?;
        let rows: Vec<CategoryRow> = self.get_json(url, "categories").await?;
        tracing::debug!(count = rows.len(), "fetched catalog categories");
        Ok(rows)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header("apikey", &self.anon_key)
                    .bearer_auth(&self.anon_key)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(1);
                    return Err(CatalogError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| CatalogError::Deserialize {
                    context: format!("{context} from {}", self.base_url),
                    source: e,
                })
            }
        })
        .await
    }

    fn view_url(&self, view: &str) -> Result<Url, CatalogError> {
        Url::parse(&format!("{}/rest/v1/{view}", self.base_url)).map_err(|e| {
            CatalogError::InvalidBaseUrl {
                base_url: self.base_url.clone(),
                reason: e.to_string(),
            }
        })
    }

    fn products_url(&self, category: Option<&str>) -> Result<Url, CatalogError> {
        let mut url = self.view_url(PRODUCTS_VIEW)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("select", PRODUCT_COLUMNS)
                .append_pair("order", "nombre.asc");
            if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
                query.append_pair("categoria", &format!("eq.{category}"));
            }
        }
        Ok(url)
    }

    fn categories_url(&self) -> Result<Url, CatalogError> {
        let mut url = self.view_url(CATEGORIES_VIEW)?;
        url.query_pairs_mut()
            .append_pair("select", CATEGORY_COLUMNS)
            .append_pair("order", "categoria.asc");
        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
