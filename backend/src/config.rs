//! Configuration management for the SuiStage backend.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Nothing here is fatal: an unset contract ID is reported by
//! [`Config::missing_required`] and the server still starts.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use suistage_store::StoreConfig;
use suistage_sui::DEFAULT_RPC_URL;
use suistage_walrus::{DEFAULT_AGGREGATOR_URL, DEFAULT_PUBLISHER_URL};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// SQLite configuration
    pub database: DatabaseConfig,
    /// Sui network configuration
    pub sui: SuiConfig,
    /// Walrus configuration
    pub walrus: WalrusConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

/// SQLite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Busy timeout in seconds
    pub busy_timeout: u64,
    /// Run `ANALYZE`/`VACUUM`/`REINDEX` every hour
    pub auto_optimize: bool,
}

/// Sui network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiConfig {
    /// Network name, informational only
    pub network: String,
    /// Full-node JSON-RPC endpoint
    pub rpc_url: String,
    /// Published package of the ticketing contract (empty when unset)
    pub package_id: String,
    /// Shared registry object of the contract (empty when unset)
    pub event_registry_id: String,
}

/// Walrus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalrusConfig {
    /// Aggregator (read) endpoint
    pub aggregator_url: String,
    /// Publisher (write) endpoint
    pub publisher_url: String,
    /// Storage duration of uploaded blobs
    pub epochs: u32,
    /// Upload size ceiling in megabytes
    pub max_image_size_mb: usize,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    ///
    /// Unparseable numbers fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port: parsed(&lookup, "PORT").unwrap_or(3000),
                environment: lookup("NODE_ENV")
                    .or_else(|| lookup("APP_ENV"))
                    .unwrap_or_else(|| "development".to_string()),
                log_level: var("LOG_LEVEL", "info"),
                cors_origins: lookup("CORS_ORIGIN").map_or_else(
                    || vec!["http://localhost:5173".to_string()],
                    |origins| {
                        origins
                            .split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(ToString::to_string)
                            .collect()
                    },
                ),
            },
            database: DatabaseConfig {
                path: PathBuf::from(var("DATABASE_PATH", "./suistage.db")),
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(5),
                busy_timeout: parsed(&lookup, "DATABASE_BUSY_TIMEOUT").unwrap_or(5),
                auto_optimize: lookup("AUTO_OPTIMIZE").is_some_and(|v| v == "true"),
            },
            sui: SuiConfig {
                network: var("SUI_NETWORK", "testnet"),
                rpc_url: var("SUI_RPC_URL", DEFAULT_RPC_URL),
                package_id: var("PACKAGE_ID", ""),
                event_registry_id: var("EVENT_REGISTRY_ID", ""),
            },
            walrus: WalrusConfig {
                aggregator_url: var("WALRUS_AGGREGATOR_URL", DEFAULT_AGGREGATOR_URL),
                publisher_url: var("WALRUS_PUBLISHER_URL", DEFAULT_PUBLISHER_URL),
                epochs: parsed(&lookup, "WALRUS_EPOCHS").unwrap_or(5),
                max_image_size_mb: parsed(&lookup, "MAX_IMAGE_SIZE_MB").unwrap_or(10),
            },
        }
    }

    /// Required variables that are unset or empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sui.package_id.is_empty() {
            missing.push("PACKAGE_ID");
        }
        if self.sui.event_registry_id.is_empty() {
            missing.push("EVENT_REGISTRY_ID");
        }
        missing
    }

    /// Tracing filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_filter(&self) -> String {
        format!("{},sqlx=warn", self.server.log_level)
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.server.environment == "production"
    }

    /// Store settings derived from the database section.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let mut store = StoreConfig::new(self.database.path.clone());
        store.max_connections = self.database.max_connections;
        store.busy_timeout = Duration::from_secs(self.database.busy_timeout);
        store
    }

    /// Upload size ceiling in bytes.
    #[must_use]
    pub const fn max_image_bytes(&self) -> usize {
        self.walrus.max_image_size_mb.saturating_mul(1024 * 1024)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
