//! Two-hop photo upload pipeline.
//!
//! A client posts a [`models::PhotoUploadRequest`] to the upload service, which
//! validates it and relays it to the storage service, which validates it again
//! and persists it through a [`domain::PhotoRepository`].

pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forwarder;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod startup;
pub mod storage;

use forwarder::PhotoForwarder;
use storage::PhotoStorageService;

/// Shared state of the storage service.
pub struct StorageState {
    pub storage: PhotoStorageService,
    pub max_image_bytes: usize,
}

/// Shared state of the upload service.
pub struct UploadState {
    pub forwarder: PhotoForwarder,
    pub max_image_bytes: usize,
}
