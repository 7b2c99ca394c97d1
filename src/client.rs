//! Client side of the upload flow.
//!
//! [`UploadForm`] models the desktop form: a selected file, a description, a
//! status line and whether the upload action is enabled. Only the task that
//! owns the form mutates it. A submission hands the network call to a spawned
//! task, whose [`UploadOutcome`] comes back over a channel and is applied by the
//! owner with [`UploadForm::apply`].

use crate::{
    config::ClientConfig,
    models::{DEFAULT_CONTENT_TYPE, PhotoUploadRequest},
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing;

/// Bound on a single upload round trip from the client's side.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Error reading file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} has no file name")]
    NoFileName { path: PathBuf },
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The upload service answered, but not with a success status.
    #[error("{status}: {body}")]
    Rejected { status: reqwest::StatusCode, body: String },
}

/// Reads `path` fully and turns it into an upload request.
///
/// The content type is guessed from the file extension, falling back to
/// `application/octet-stream`. The description is sent as typed.
pub async fn build_request(path: &Path, description: &str) -> Result<PhotoUploadRequest, ClientError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::NoFileName { path: path.to_path_buf() })?;

    let image_data = tokio::fs::read(path).await.map_err(|source| ClientError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let content_type = match mime_guess::from_path(path).first_raw() {
        Some(mime) => mime.to_string(),
        None => {
            tracing::warn!(%filename, "Could not determine content type, using default");
            DEFAULT_CONTENT_TYPE.to_string()
        }
    };

    let description = Some(description.to_string());

    Ok(PhotoUploadRequest {
        filename,
        content_type,
        image_data,
        description,
    })
}

/// Thin HTTP client for the upload service.
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    upload_url: String,
}

impl UploadClient {
    pub fn new(upload_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self {
            client,
            upload_url: upload_url.into(),
        })
    }

    /// Posts the request and returns the upload service's response body.
    pub async fn upload(&self, request: &PhotoUploadRequest) -> Result<String, ClientError> {
        tracing::debug!(url = %self.upload_url, filename = %request.filename, "Sending upload request");
        let response = self.client.post(&self.upload_url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Rejected { status, body })
        }
    }
}

/// Result of one submission, delivered back to the form's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded { filename: String, response: String },
    Failed { filename: String, message: String },
}

#[derive(Debug)]
pub struct UploadForm {
    client: Option<UploadClient>,
    selected_file: Option<PathBuf>,
    description: String,
    status: String,
    in_flight: bool,
}

impl UploadForm {
    /// Builds the form. Without a usable upload URL the form stays disabled.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let (client, status) = match &config.upload_service_url {
            Some(url) => {
                tracing::info!(%url, "Loaded upload service URL");
                (Some(UploadClient::new(url.clone())?), String::new())
            }
            None => {
                tracing::error!("No upload service URL configured");
                (None, "Error: Could not load service URL from configuration.".to_string())
            }
        };
        Ok(Self {
            client,
            selected_file: None,
            description: String::new(),
            status,
            in_flight: false,
        })
    }

    pub fn select_file(&mut self, path: Option<PathBuf>) {
        self.selected_file = path;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Upload is enabled only with a selected file, a configured URL and no
    /// submission already running.
    pub fn can_upload(&self) -> bool {
        self.client.is_some() && self.selected_file.is_some() && !self.in_flight
    }

    /// Starts an upload. Returns `false` if nothing was sent, in which case
    /// the status line explains why.
    ///
    /// The file is read here; read failures end the submission before any
    /// network traffic. The network call itself runs on a spawned task and
    /// reports through `outcomes`.
    pub async fn submit(&mut self, outcomes: &mpsc::UnboundedSender<UploadOutcome>) -> bool {
        let (Some(client), Some(path)) = (self.client.clone(), self.selected_file.clone()) else {
            self.status = if self.client.is_none() {
                "Error: Could not load service URL from configuration.".to_string()
            } else {
                "Please select a file first.".to_string()
            };
            return false;
        };
        if self.in_flight {
            return false;
        }

        let request = match build_request(&path, &self.description).await {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not prepare upload");
                self.status = e.to_string();
                return false;
            }
        };

        self.status = format!("Uploading {}...", request.filename);
        self.in_flight = true;

        let outcomes = outcomes.clone();
        tokio::spawn(async move {
            let filename = request.filename.clone();
            let outcome = match client.upload(&request).await {
                Ok(response) => UploadOutcome::Succeeded { filename, response },
                Err(e) => UploadOutcome::Failed {
                    filename,
                    message: e.to_string(),
                },
            };
            if outcomes.send(outcome).is_err() {
                tracing::warn!("Upload finished after the form was closed");
            }
        });
        true
    }

    /// Applies a finished upload. Inputs are cleared only on success.
    pub fn apply(&mut self, outcome: UploadOutcome) {
        self.in_flight = false;
        match outcome {
            UploadOutcome::Succeeded { filename, response } => {
                tracing::info!(%filename, %response, "Upload response");
                self.status = format!("Upload successful: {}", response);
                self.selected_file = None;
                self.description.clear();
            }
            UploadOutcome::Failed { filename, message } => {
                tracing::error!(%filename, %message, "Upload failed");
                self.status = format!("Upload failed: {}", message);
            }
        }
    }
}
