//! Environment-based configuration for the scrape engine.
//!
//! The settings store that backs the full product lives outside this
//! workspace; binaries in this repo read the same knobs from environment
//! variables instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ScrapeSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Fully resolved engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: ScrapeSettings,
    /// Location of the failed-scrape retry queue file.
    pub queue_path: PathBuf,
    pub log_level: String,
}

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a provider is configured without an API key or a
/// numeric knob fails to parse.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load engine configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a provider is configured without an API key or a
/// numeric knob fails to parse.
pub fn load_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the actual environment so it can be tested with a pure
/// `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let provider = lookup("SERPWATCH_PROVIDER")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let api_key = or_default("SERPWATCH_API_KEY", "");

    // A configured provider without credentials would fail on every scrape;
    // surface it at startup instead.
    if provider.is_some() && api_key.is_empty() {
        return Err(ConfigError::MissingEnvVar("SERPWATCH_API_KEY".to_string()));
    }

    let api_secret = lookup("SERPWATCH_API_SECRET").ok();
    let proxy_list = lookup("SERPWATCH_PROXY_LIST")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let scrape_delay_ms = parse_u64("SERPWATCH_SCRAPE_DELAY_MS", "0")?;
    let request_timeout_secs = parse_u64("SERPWATCH_REQUEST_TIMEOUT_SECS", "30")?;

    let queue_path = PathBuf::from(or_default(
        "SERPWATCH_QUEUE_PATH",
        "./data/failed_queue.json",
    ));
    let log_level = or_default("SERPWATCH_LOG_LEVEL", "info");

    Ok(EngineConfig {
        settings: ScrapeSettings {
            provider,
            api_key,
            api_secret,
            proxy_list,
            scrape_delay_ms,
            request_timeout_secs,
            api_base: None,
        },
        queue_path,
        log_level,
    })
}
