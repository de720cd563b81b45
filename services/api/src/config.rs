//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use sungura_core::routing::{ModelCatalog, DEFAULT_MULTIMODAL_MODEL, DEFAULT_TEXT_MODEL};
use tracing::Level;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_ROUTE_PREFIXES: &str = "/api,/.netlify/functions/api";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Connection details for the chat log database. Both parts are required.
#[derive(Clone, Debug)]
pub struct PersistenceConfig {
    pub database_url: String,
    pub service_key: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub app_env: Option<String>,
    pub provider_api_key: Option<String>,
    pub provider_base_url: String,
    pub provider_timeout: Duration,
    pub provider_max_retries: usize,
    pub models: ModelCatalog,
    pub persistence: Option<PersistenceConfig>,
    pub route_prefixes: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Server ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let mut bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;
        if let Some(port) = var("PORT") {
            let port = port.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue("PORT".to_string(), e.to_string())
            })?;
            bind_address.set_port(port);
        }

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let app_env = var("APP_ENV");

        // --- Completion Provider ---
        let provider_api_key = var("OPENROUTER_API_KEY").map(|k| k.trim().to_string());
        let provider_base_url =
            var("PROVIDER_BASE_URL").unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());

        let provider_timeout = Duration::from_secs(parse_or(&var, "PROVIDER_TIMEOUT_SECS", 60)?);
        let provider_max_retries = parse_or(&var, "PROVIDER_MAX_RETRIES", 2)?;

        let models = ModelCatalog::new(
            var("TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            var("VISION_MODEL").unwrap_or_else(|| DEFAULT_MULTIMODAL_MODEL.to_string()),
        );

        // --- Persistence (optional) ---
        let persistence = match (var("DATABASE_URL"), var("DATABASE_SERVICE_KEY")) {
            (Some(database_url), Some(service_key)) => Some(PersistenceConfig {
                database_url,
                service_key,
            }),
            _ => None,
        };

        let route_prefixes = parse_prefixes(
            &var("ROUTE_PREFIXES").unwrap_or_else(|| DEFAULT_ROUTE_PREFIXES.to_string()),
        )?;

        Ok(Self {
            bind_address,
            log_level,
            app_env,
            provider_api_key,
            provider_base_url,
            provider_timeout,
            provider_max_retries,
            models,
            persistence,
            route_prefixes,
        })
    }

    pub fn api_key_set(&self) -> bool {
        self.provider_api_key.is_some()
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Splits a comma-separated prefix list. Every prefix must start with `/`;
/// the root mount is always present and is skipped here.
fn parse_prefixes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut prefixes: Vec<String> = Vec::new();
    for prefix in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "ROUTE_PREFIXES".to_string(),
                format!("'{}' must start with '/'", prefix),
            ));
        }
        let prefix = prefix.trim_end_matches('/');
        if !prefix.is_empty() && !prefixes.iter().any(|p| p == prefix) {
            prefixes.push(prefix.to_string());
        }
    }
    Ok(prefixes)
}
