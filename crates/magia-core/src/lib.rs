pub mod app_config;
pub mod config;
pub mod ledger;
pub mod pricing;
pub mod products;
pub mod store;
pub mod summary;

pub use app_config::{AppConfig, Environment, RemoteCatalogConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use ledger::{EstimateLedger, LineItem, NewLineItem};
pub use pricing::{
    default_tier, headline_price, price_options, unit_price, CategoryClass, PriceOption,
};
pub use products::{PriceTier, Product, TierPrices};
pub use store::{FileStore, LedgerStore, MemoryStore, StoreError};
pub use summary::{category_display_name, format_mxn, ContactLinks, EstimateSummary, SummaryLine};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown price tier: {0}")]
    UnknownTier(String),
}
