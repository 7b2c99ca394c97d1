use crate::{StorageState, UploadState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub const STORE_PHOTO_ROUTE: &str = "/api/v1/photos";
pub const UPLOAD_ROUTE: &str = "/api/v1/upload";

/// How many times the largest valid image the transport accepts. Images
/// between the validation limit and this ceiling get the size message from
/// `validate` instead of a bare 413.
const BODY_LIMIT_FACTOR: usize = 4;

/// Base64 grows the payload by a third; leave headroom for the other JSON fields.
fn body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes
        .saturating_mul(BODY_LIMIT_FACTOR)
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(64 * 1024)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router for the storage service.
pub fn storage_router(state: Arc<StorageState>) -> Router {
    Router::new()
        .route(STORE_PHOTO_ROUTE, post(handlers::store_photo))
        .route("/health", get(handlers::health))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit(state.max_image_bytes)))
        .with_state(state)
}

/// Router for the upload service.
pub fn upload_router(state: Arc<UploadState>) -> Router {
    Router::new()
        .route(UPLOAD_ROUTE, post(handlers::upload_photo))
        .route("/health", get(handlers::health))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit(state.max_image_bytes)))
        .with_state(state)
}
