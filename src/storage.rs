use crate::{
    domain::PhotoRepository,
    errors::StorageError,
    models::{NewPhoto, PhotoUploadRequest},
};
use std::sync::Arc;
use tracing;

/// Persists validated upload requests through a [`PhotoRepository`].
#[derive(Clone)]
pub struct PhotoStorageService {
    repo: Arc<dyn PhotoRepository>,
}

impl PhotoStorageService {
    pub fn new(repo: Arc<dyn PhotoRepository>) -> Self {
        Self { repo }
    }

    /// Stores the photo and returns the filename it was stored under.
    pub async fn store_photo(&self, request: &PhotoUploadRequest) -> Result<String, StorageError> {
        tracing::debug!(filename = %request.filename, "Storing photo");

        match self.repo.create(NewPhoto::from(request)).await {
            Ok(photo) => {
                tracing::info!(photo_id = photo.id(), filename = %photo.filename(), "Photo saved to database");
                Ok(photo.filename().to_string())
            }
            Err(source) => {
                tracing::error!(filename = %request.filename, error = %source, "Error saving photo to database");
                Err(StorageError::PersistFailed {
                    filename: request.filename.clone(),
                    source,
                })
            }
        }
    }
}
