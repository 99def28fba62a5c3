//! Application state for the HTTP server.

use crate::config::Config;
use crate::services::EventService;
use std::sync::Arc;
use std::time::Instant;
use suistage_walrus::WalrusClient;

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply) for each request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Event reads and chain sync
    pub service: EventService,

    /// Walrus client for image uploads
    pub walrus: Arc<WalrusClient>,

    /// Loaded configuration
    pub config: Arc<Config>,

    /// When the server started, for `/health` uptime
    pub started_at: Instant,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(service: EventService, walrus: Arc<WalrusClient>, config: Arc<Config>) -> Self {
        Self {
            service,
            walrus,
            config,
            started_at: Instant::now(),
        }
    }
}
