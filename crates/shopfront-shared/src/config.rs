//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_LOOKUP_TIMEOUT_MS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub tenancy: TenancySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Tenant resolution knobs shared by the resolver and cache.
#[derive(Debug, Deserialize, Clone)]
pub struct TenancySettings {
    /// How long a resolved tenant stays cached, in seconds.
    pub cache_ttl_secs: u64,
    /// Defensive upper bound on cached hosts; LRU beyond this.
    pub cache_capacity: usize,
    /// Upper bound on a single directory lookup, in milliseconds.
    pub lookup_timeout_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "shopfront-server")?
            .set_default("tenancy.cache_ttl_secs", DEFAULT_CACHE_TTL_SECS)?
            .set_default("tenancy.cache_capacity", DEFAULT_CACHE_CAPACITY as u64)?
            .set_default("tenancy.lookup_timeout_ms", DEFAULT_LOOKUP_TIMEOUT_MS)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
