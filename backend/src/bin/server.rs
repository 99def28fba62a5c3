//! SuiStage HTTP server.
//!
//! Caches ticketing contract events from Sui in SQLite and serves them over
//! REST.

use std::time::Duration;
use suistage_backend::bootstrap::ResourceManager;
use suistage_backend::config::Config;
use suistage_backend::server::build_router;
use suistage_store::SqliteStore;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OPTIMIZE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SuiStage server");
    info!(
        environment = %config.server.environment,
        network = %config.sui.network,
        package_id = if config.sui.package_id.is_empty() { "Not set" } else { config.sui.package_id.as_str() },
        "Configuration loaded"
    );

    let missing = config.missing_required();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "Missing environment variables, check your .env file");
    }

    let resources = ResourceManager::from_config(&config).await?;

    match resources.store.database_stats().await {
        Ok(stats) => info!(
            events = stats.events,
            transactions = stats.transactions,
            reservations = stats.reservations,
            size_bytes = stats.size_bytes,
            "Database statistics"
        ),
        Err(e) => warn!(error = %e, "Failed to read database statistics"),
    }

    if config.sui.event_registry_id.is_empty() {
        warn!("EVENT_REGISTRY_ID not set, skipping contract verification");
    } else {
        resources
            .sui
            .verify_contract_deployment(&config.sui.event_registry_id)
            .await;
    }

    if config.database.auto_optimize {
        spawn_optimizer(resources.store.clone());
    }

    let app = build_router(resources.app_state());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    resources.store.close().await;
    info!("Server stopped");
    Ok(())
}

/// Optimize the database every hour.
fn spawn_optimizer(store: SqliteStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(OPTIMIZE_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(e) = store.optimize().await {
                error!(error = %e, "Scheduled database optimization failed");
            }
        }
    });
    info!("Hourly database optimization enabled");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
