use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection details for the hosted catalog database.
#[derive(Clone)]
pub struct RemoteCatalogConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for RemoteCatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCatalogConfig")
            .field("url", &self.url)
            .field("anon_key", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// `None` runs against the built-in fallback catalog only.
    pub remote_catalog: Option<RemoteCatalogConfig>,
    pub fallback_catalog_path: Option<PathBuf>,
    pub ledger_dir: PathBuf,
    pub ledger_key: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub telegram_handle: String,
    pub telegram_phone: Option<String>,
}
