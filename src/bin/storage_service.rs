use photo_relay::{config::StorageConfig, routes, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    startup::init_tracing();

    // --- Configuration ---
    let config = StorageConfig::load()?;
    tracing::info!(database_url = %config.database_url, "Starting photo storage service");

    // --- Storage backend ---
    let repo = startup::connect_repository(&config).await?;
    let state = startup::storage_state(&config, repo);

    // --- Server Startup ---
    let app = routes::storage_router(state);
    startup::serve(app, config.bind_address).await
}
