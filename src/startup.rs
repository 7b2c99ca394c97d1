use crate::{
    StorageState, UploadState,
    config::{StorageConfig, UploadConfig},
    forwarder::PhotoForwarder,
    repositories::SqlitePhotoRepository,
    storage::PhotoStorageService,
};
use anyhow::Context;
use axum::Router;
use backoff::ExponentialBackoff;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on how long startup keeps retrying the database.
const DATABASE_CONNECT_DEADLINE: Duration = Duration::from_secs(30);

/// Initializes tracing (logging) from `RUST_LOG`, with a debug default for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "photo_relay=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Opens the photo database, retrying with exponential backoff while it is unavailable.
pub async fn connect_repository(config: &StorageConfig) -> anyhow::Result<SqlitePhotoRepository> {
    tracing::info!("Startup: Connecting to photo database...");
    // A malformed URL will not fix itself, so it fails before the retry loop.
    let options = SqlitePhotoRepository::connect_options(&config.database_url)?;
    let policy = ExponentialBackoff {
        max_elapsed_time: Some(DATABASE_CONNECT_DEADLINE),
        ..Default::default()
    };

    let repo = backoff::future::retry(policy, || {
        let options = options.clone();
        async move {
            SqlitePhotoRepository::connect_with(options, config.database_max_connections)
                .await
                .map_err(|e| {
                    tracing::warn!("Startup: Database not ready, retrying: {:#}", e);
                    backoff::Error::transient(e)
                })
        }
    })
    .await
    .context("Startup: Giving up on the photo database")?;

    tracing::info!("Startup: Photo database ready.");
    Ok(repo)
}

/// Builds the storage service state around an already-connected repository.
pub fn storage_state(config: &StorageConfig, repo: SqlitePhotoRepository) -> Arc<StorageState> {
    Arc::new(StorageState {
        storage: PhotoStorageService::new(Arc::new(repo)),
        max_image_bytes: config.max_image_bytes,
    })
}

/// Builds the upload service state, including the forwarding HTTP client.
pub fn upload_state(config: &UploadConfig) -> anyhow::Result<Arc<UploadState>> {
    let forwarder = PhotoForwarder::new(&config.storage_service_url, config.forward_timeout)
        .context("Startup: Failed to build HTTP client for the storage service")?;
    Ok(Arc::new(UploadState {
        forwarder,
        max_image_bytes: config.max_image_bytes,
    }))
}

/// Serves `app` on `addr` until Ctrl-C.
pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
