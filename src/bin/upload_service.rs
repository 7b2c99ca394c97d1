use photo_relay::{config::UploadConfig, routes, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    startup::init_tracing();

    // --- Configuration ---
    let config = UploadConfig::load()?;
    tracing::info!(
        storage_service_url = %config.storage_service_url,
        forward_timeout = ?config.forward_timeout,
        "Starting photo upload service"
    );

    let state = startup::upload_state(&config)?;

    // --- Server Startup ---
    let app = routes::upload_router(state);
    startup::serve(app, config.bind_address).await
}
