use crate::{StorageState, UploadState, errors::AppError, models::PhotoUploadRequest};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{self, Instrument};
use uuid::Uuid;

/// Handler for POST /api/v1/photos on the storage service.
pub async fn store_photo(
    State(state): State<Arc<StorageState>>,
    Json(request): Json<PhotoUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate(state.max_image_bytes)?;

    tracing::info!(
        filename = %request.filename,
        size_kib = request.size_kib(),
        "Received photo storage request"
    );

    let stored_filename = state.storage.store_photo(&request).await?;

    tracing::info!(filename = %stored_filename, "Photo successfully stored");
    Ok((
        StatusCode::CREATED,
        format!("Photo stored successfully: {}", stored_filename),
    ))
}

/// Handler for POST /api/v1/upload on the upload service.
///
/// Validates with the same rules as the storage service, then relays the body
/// unchanged. The forward is awaited inside a span carrying the request id and
/// filename, so log lines from both sides of the await stay correlated.
pub async fn upload_photo(
    State(state): State<Arc<UploadState>>,
    Json(request): Json<PhotoUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("upload", %request_id, filename = %request.filename);

    async move {
        request.validate(state.max_image_bytes)?;

        tracing::info!(size_kib = request.size_kib(), "Received upload request");

        let response = state.forwarder.forward(&request).await?;

        tracing::info!(storage_response = %response, "Upload successful");
        Ok::<_, AppError>((StatusCode::OK, format!("Upload successful: {}", response)))
    }
    .instrument(span)
    .await
}

/// Liveness probe shared by both services.
pub async fn health() -> &'static str {
    "ok"
}
