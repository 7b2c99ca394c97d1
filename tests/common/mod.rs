#![allow(dead_code)]

use async_trait::async_trait;
use photo_relay::{
    StorageState, UploadState,
    config::DEFAULT_MAX_IMAGE_BYTES,
    domain::PhotoRepository,
    errors::RepoError,
    forwarder::PhotoForwarder,
    models::{NewPhoto, Photo, PhotoUploadRequest},
    repositories::SqlitePhotoRepository,
    routes,
    storage::PhotoStorageService,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};

/// A storage backend that rejects every write.
pub struct FailingRepository;

#[async_trait]
impl PhotoRepository for FailingRepository {
    async fn create(&self, _photo: NewPhoto) -> Result<Photo, RepoError> {
        Err(RepoError::BackendError(anyhow::anyhow!("connection reset by database")))
    }

    async fn get_by_id(&self, _id: i64) -> Result<Option<Photo>, RepoError> {
        Ok(None)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(0)
    }
}

pub fn cat_request() -> PhotoUploadRequest {
    PhotoUploadRequest {
        filename: "cat.png".to_string(),
        content_type: "image/png".to_string(),
        image_data: (0u8..37).collect(),
        description: Some("a cat".to_string()),
    }
}

pub async fn memory_repo() -> SqlitePhotoRepository {
    SqlitePhotoRepository::connect_in_memory()
        .await
        .expect("in-memory database")
}

pub fn storage_state(repo: Arc<dyn PhotoRepository>) -> Arc<StorageState> {
    storage_state_with_limit(repo, DEFAULT_MAX_IMAGE_BYTES)
}

pub fn storage_state_with_limit(repo: Arc<dyn PhotoRepository>, max_image_bytes: usize) -> Arc<StorageState> {
    Arc::new(StorageState {
        storage: PhotoStorageService::new(repo),
        max_image_bytes,
    })
}

pub fn upload_state(storage_url: &str) -> Arc<UploadState> {
    upload_state_with_limit(storage_url, DEFAULT_MAX_IMAGE_BYTES)
}

pub fn upload_state_with_limit(storage_url: &str, max_image_bytes: usize) -> Arc<UploadState> {
    Arc::new(UploadState {
        forwarder: PhotoForwarder::new(storage_url, Duration::from_secs(5)).expect("forwarder"),
        max_image_bytes,
    })
}

/// Runs a real storage service on an ephemeral port and returns its base URL.
pub async fn spawn_storage_service(repo: SqlitePhotoRepository) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::storage_router(storage_state(Arc::new(repo)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
