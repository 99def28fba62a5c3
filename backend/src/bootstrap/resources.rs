//! Resource setup.
//!
//! Opens the SQLite cache and builds the Sui and Walrus clients from
//! [`Config`], so the binary and the tests wire the application the same way.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! let resources = ResourceManager::from_config(&config).await?;
//! let app = build_router(resources.app_state());
//! ```

use crate::config::Config;
use crate::server::AppState;
use crate::services::EventService;
use std::sync::Arc;
use suistage_store::{SqliteStore, StoreError};
use suistage_sui::SuiClient;
use suistage_walrus::WalrusClient;
use tracing::info;

/// Owns every infrastructure resource the server needs.
///
/// All fields are cheap to clone and can be shared across tasks.
#[derive(Clone, Debug)]
pub struct ResourceManager {
    /// Application configuration
    pub config: Arc<Config>,

    /// SQLite cache
    pub store: SqliteStore,

    /// Sui full node client
    pub sui: Arc<SuiClient>,

    /// Walrus client
    pub walrus: Arc<WalrusClient>,

    /// Event service over `store` and `sui`
    pub service: EventService,
}

impl ResourceManager {
    /// Open the database at the configured path and build the clients.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        info!(path = %config.database.path.display(), "Opening database...");
        let store = SqliteStore::open(&config.store_config()).await?;
        info!("Database ready");

        Ok(Self::with_store(config, store))
    }

    /// Build the clients around an already opened store.
    #[must_use]
    pub fn with_store(config: &Config, store: SqliteStore) -> Self {
        let sui = Arc::new(SuiClient::new(config.sui.rpc_url.clone()));
        info!(rpc_url = %config.sui.rpc_url, network = %config.sui.network, "Sui client initialized");

        let walrus = Arc::new(
            WalrusClient::new(
                config.walrus.publisher_url.clone(),
                config.walrus.aggregator_url.clone(),
            )
            .with_epochs(config.walrus.epochs)
            .with_max_image_bytes(config.max_image_bytes()),
        );
        info!(
            publisher = %config.walrus.publisher_url,
            aggregator = %config.walrus.aggregator_url,
            "Walrus client initialized"
        );

        let service = EventService::new(store.clone(), Arc::clone(&sui), &config.sui.package_id);

        Self {
            config: Arc::new(config.clone()),
            store,
            sui,
            walrus,
            service,
        }
    }

    /// Shared state for the HTTP handlers.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.service.clone(),
            Arc::clone(&self.walrus),
            Arc::clone(&self.config),
        )
    }
}
