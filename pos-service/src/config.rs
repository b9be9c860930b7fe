//! Configuration for pos-service.

use retail_core::config::Config;
use retail_core::error::AppError;
use serde::Deserialize;

/// Database connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

/// Full service configuration, loaded from `configuration.*` files and
/// `POS__`-prefixed environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct PosConfig {
    #[serde(flatten)]
    pub common: Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; tracing is stdout-only when unset.
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    /// Where the held-order snapshot file lives on this device.
    #[serde(default = "default_held_orders_path")]
    pub held_orders_path: String,
}

fn default_service_name() -> String {
    "pos-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_held_orders_path() -> String {
    "data/held_orders.json".to_string()
}

impl PosConfig {
    pub fn from_env() -> Result<Self, AppError> {
        retail_core::config::load("POS")
    }
}
