use crate::errors::RepoError;
use crate::models::{NewPhoto, Photo};
use async_trait::async_trait;

/// Trait defining the storage backend for photo records.
#[async_trait]
pub trait PhotoRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Persists a photo in one atomic step, assigning its id and upload timestamp.
    async fn create(&self, photo: NewPhoto) -> Result<Photo, RepoError>;

    /// Retrieves a photo by id.
    /// Returns Ok(None) if no such photo exists.
    async fn get_by_id(&self, id: i64) -> Result<Option<Photo>, RepoError>;

    /// Number of stored photos.
    async fn count(&self) -> Result<i64, RepoError>;
}
