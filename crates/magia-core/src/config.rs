use crate::app_config::{AppConfig, Environment, RemoteCatalogConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or only half of the remote
/// catalog credentials are set.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or only half of the remote
/// catalog credentials are set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Kept separate from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    // Blank values count as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("MAGIA_ENV", "development"))?;
    let log_level = or_default("MAGIA_LOG_LEVEL", "info");

    let remote_catalog = match (optional("SUPABASE_URL"), optional("SUPABASE_ANON_KEY")) {
        (Some(url), Some(anon_key)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidEnvVar {
                    var: "SUPABASE_URL".to_string(),
                    reason: "must start with http:// or https://".to_string(),
                });
            }
            Some(RemoteCatalogConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            })
        }
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("SUPABASE_ANON_KEY".to_string())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SUPABASE_URL".to_string())),
        (None, None) => None,
    };

    let fallback_catalog_path = optional("MAGIA_FALLBACK_CATALOG_PATH").map(PathBuf::from);
    let ledger_dir = PathBuf::from(or_default("MAGIA_LEDGER_DIR", "./.magia"));
    let ledger_key = or_default("MAGIA_LEDGER_KEY", "magiabuena_cart");

    let request_timeout_secs = parse_u64("MAGIA_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("MAGIA_USER_AGENT", "magia/0.1 (price-estimator)");
    let max_retries = parse_u32("MAGIA_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("MAGIA_RETRY_BACKOFF_BASE_MS", "500")?;

    let telegram_handle = or_default("MAGIA_TELEGRAM_HANDLE", "magiabuena");
    let telegram_phone = optional("MAGIA_TELEGRAM_PHONE");

    Ok(AppConfig {
        env,
        log_level,
        remote_catalog,
        fallback_catalog_path,
        ledger_dir,
        ledger_key,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        telegram_handle,
        telegram_phone,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognised values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAGIA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
