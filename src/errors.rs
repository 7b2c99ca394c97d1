use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ValidationError;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error),

    #[error("Stored photo {0} could not be decoded")]
    DataCorruption(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    /// The message carries the filename so server logs stay traceable.
    #[error("Failed to store photo in database: {filename}")]
    PersistFailed {
        filename: String,
        #[source]
        source: RepoError,
    },
}

#[derive(Error, Debug)]
pub enum ForwardError {
    /// Connection failures, timeouts, non-2xx answers and body decoding all land here.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to store photo: {0}")]
    Storage(#[from] StorageError),

    #[error("Upload failed: {0}")]
    Forward(#[from] ForwardError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Forward(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Validation(e) => {
                tracing::warn!(error.message = %e, "Rejecting invalid photo request");
            }
            AppError::Storage(e) => {
                tracing::error!(error.source = ?e, "Storage error occurred");
            }
            AppError::Forward(e) => {
                tracing::error!(error.source = ?e, "Forward to storage service failed");
            }
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request_with_bare_message() {
        let err = AppError::from(ValidationError::EmptyFilename);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Filename cannot be empty.");
    }

    #[test]
    fn storage_errors_keep_the_filename() {
        let err = AppError::from(StorageError::PersistFailed {
            filename: "cat.png".to_string(),
            source: RepoError::BackendError(anyhow::anyhow!("disk full")),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Failed to store photo: Failed to store photo in database: cat.png"
        );
    }
}
