//! Clearance Server
//!
//! HTTP front for the discount engine plus the daily scheduled batch.
//! Manual triggers and the scheduler share one sweeper, and one shutdown
//! signal stops both.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use clearance_clients::{CatalogClient, ChurnClient, ClientError};
use clearance_domain::{CatalogSource, SignalSource};
use clearance_sweeper::{ConfigStore, Sweeper, SweeperConfig, SweeperWorker};
use config::{ServerConfig, ServiceConfig};
use handlers::{create_router, AppState};
use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Collaborator client could not be built
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the fmt subscriber, honoring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn churn_client(config: &ServiceConfig) -> Result<ChurnClient, ClientError> {
    match config.timeout_secs {
        Some(secs) => ChurnClient::with_timeout(
            config.base_url.clone(),
            config.token.clone(),
            Duration::from_secs(secs),
        ),
        None => ChurnClient::new(config.base_url.clone(), config.token.clone()),
    }
}

fn catalog_client(config: &ServiceConfig) -> Result<CatalogClient, ClientError> {
    match config.timeout_secs {
        Some(secs) => CatalogClient::with_timeout(
            config.base_url.clone(),
            config.token.clone(),
            Duration::from_secs(secs),
        ),
        None => CatalogClient::new(config.base_url.clone(), config.token.clone()),
    }
}

/// Start the HTTP server and the daily worker
///
/// Validates the configuration, builds both collaborator clients, and
/// serves until Ctrl+C stops the server and the scheduler together.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();
    config.validate()?;
    config
        .sweeper
        .validate()
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Starting Clearance server");
    info!("Bind address: {}", config.bind_addr());
    info!("Churn service: {}", config.churn.base_url);
    info!("Catalog service: {}", config.catalog.base_url);

    let sweeper = Sweeper::new(
        churn_client(&config.churn)?,
        catalog_client(&config.catalog)?,
        ConfigStore::default(),
        config.sweeper.clone(),
    );
    let state = AppState::new(sweeper);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    serve(listener, state, config.sweeper, ctrl_c()).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Resolves once `stop` flips to true or its sender is gone
async fn stopped(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            break;
        }
    }
}

/// Serve `state` on `listener` with the daily worker alongside
///
/// When `shutdown` resolves the server stops accepting connections and the
/// worker leaves its loop; this returns once both have stopped.
pub async fn serve<S, C, F>(
    listener: TcpListener,
    state: AppState<S, C>,
    sweeper_config: SweeperConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    S: SignalSource + 'static,
    C: CatalogSource + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);

    let mut worker = SweeperWorker::new(state.sweeper.clone(), sweeper_config);
    let running = state.scheduler_running.clone();
    running.store(true, Ordering::Relaxed);
    let worker_task = tokio::spawn(async move {
        if let Err(e) = worker.run(stopped(stop_rx)).await {
            tracing::error!("Sweeper worker failed: {}", e);
        }
        running.store(false, Ordering::Relaxed);
    });

    // Dropping the sender on a serve error also stops the worker
    let app = create_router(state);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown signal received, stopping server and scheduler");
            let _ = stop_tx.send(true);
        })
        .await;

    if let Err(e) = worker_task.await {
        tracing::error!("Sweeper worker task panicked: {}", e);
    }
    info!("Server stopped");

    result.map_err(|e| ServerError::Server(e.to_string()))
}
