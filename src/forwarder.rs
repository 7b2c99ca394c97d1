use crate::{errors::ForwardError, models::PhotoUploadRequest};
use std::time::Duration;
use tracing;

/// Relative path of the storage endpoint on the storage service.
pub const STORAGE_PHOTOS_PATH: &str = "/api/v1/photos";

/// Relays upload requests to the storage service.
///
/// The HTTP client is built once and reused; every forward is bounded by the
/// configured timeout and is never retried, since the storage endpoint creates
/// a new record on every accepted request.
#[derive(Debug, Clone)]
pub struct PhotoForwarder {
    client: reqwest::Client,
    photos_url: String,
}

impl PhotoForwarder {
    pub fn new(storage_service_url: &str, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let photos_url = format!("{}{}", storage_service_url.trim_end_matches('/'), STORAGE_PHOTOS_PATH);
        tracing::info!(%photos_url, ?timeout, "Photo forwarder initialized");
        Ok(Self { client, photos_url })
    }

    pub fn photos_url(&self) -> &str {
        &self.photos_url
    }

    /// Sends the request body unchanged and returns the storage service's response text.
    pub async fn forward(&self, request: &PhotoUploadRequest) -> Result<String, ForwardError> {
        tracing::debug!(filename = %request.filename, url = %self.photos_url, "Forwarding photo to storage service");

        let result = async {
            let response = self
                .client
                .post(&self.photos_url)
                .json(request)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        }
        .await;

        match result {
            Ok(body) => {
                tracing::debug!(filename = %request.filename, response = %body, "Storage service accepted photo");
                Ok(body)
            }
            Err(e) => {
                tracing::error!(
                    filename = %request.filename,
                    status = ?e.status(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "Failed to send photo to storage service"
                );
                Err(ForwardError::Transport(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> PhotoUploadRequest {
        PhotoUploadRequest {
            filename: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            image_data: vec![1; 37],
            description: Some("a cat".to_string()),
        }
    }

    #[tokio::test]
    async fn posts_the_request_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STORAGE_PHOTOS_PATH))
            .and(body_json(serde_json::to_value(request()).unwrap()))
            .respond_with(ResponseTemplate::new(201).set_body_string("Photo stored successfully: cat.png"))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = PhotoForwarder::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap();
        let body = forwarder.forward(&request()).await.unwrap();

        assert_eq!(body, "Photo stored successfully: cat.png");
        assert_eq!(forwarder.photos_url(), format!("{}/api/v1/photos", server.uri()));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Filename cannot be empty."))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = PhotoForwarder::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let ForwardError::Transport(e) = forwarder.forward(&request()).await.unwrap_err();

        assert_eq!(e.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn slow_storage_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let forwarder = PhotoForwarder::new(&server.uri(), Duration::from_millis(200)).unwrap();
        let ForwardError::Transport(e) = forwarder.forward(&request()).await.unwrap_err();

        assert!(e.is_timeout());
    }
}
