use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback content type when nothing better is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The wire record shared by the client, the upload service and the storage service.
///
/// Missing or `null` `filename`, `contentType` or `imageData` fields deserialize
/// to empty values so that they are reported by [`PhotoUploadRequest::validate`]
/// rather than as a JSON parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_type: String,
    #[serde(default, with = "base64_bytes")]
    pub image_data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image data cannot be empty.")]
    EmptyImageData,
    #[error("Filename cannot be empty.")]
    EmptyFilename,
    #[error("Content type cannot be empty.")]
    EmptyContentType,
    #[error("Image size ({size} bytes) exceeds maximum allowed size ({max} bytes).")]
    ImageTooLarge { size: usize, max: usize },
}

impl PhotoUploadRequest {
    /// Checks the request before anything is forwarded or persisted.
    /// The first failing check wins.
    pub fn validate(&self, max_image_bytes: usize) -> Result<(), ValidationError> {
        if self.image_data.is_empty() {
            return Err(ValidationError::EmptyImageData);
        }
        if self.filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        if self.content_type.trim().is_empty() {
            return Err(ValidationError::EmptyContentType);
        }
        if self.image_data.len() > max_image_bytes {
            return Err(ValidationError::ImageTooLarge {
                size: self.image_data.len(),
                max: max_image_bytes,
            });
        }
        Ok(())
    }

    /// Size in KiB, for log lines.
    pub fn size_kib(&self) -> usize {
        self.image_data.len() / 1024
    }
}

/// A photo that has not been persisted yet. It has no id and no timestamp;
/// both are assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub filename: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
    pub description: Option<String>,
}

impl From<&PhotoUploadRequest> for NewPhoto {
    fn from(request: &PhotoUploadRequest) -> Self {
        Self {
            filename: request.filename.clone(),
            content_type: request.content_type.clone(),
            image_data: request.image_data.clone(),
            description: request.description.clone(),
        }
    }
}

/// A persisted photo record. Immutable once the repository hands it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    id: i64,
    filename: String,
    content_type: String,
    image_data: Vec<u8>,
    description: Option<String>,
    upload_timestamp: DateTime<Utc>,
}

impl Photo {
    /// Only repositories should call this; everyone else receives a `Photo`.
    pub(crate) fn from_parts(id: i64, draft: NewPhoto, upload_timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            filename: draft.filename,
            content_type: draft.content_type,
            image_data: draft.image_data,
            description: draft.description,
            upload_timestamp,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn upload_timestamp(&self) -> DateTime<Utc> {
        self.upload_timestamp
    }
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Standard base64 text on the wire, raw bytes in memory.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        // Jackson-style clients send `null` for an absent byte array.
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(text) => STANDARD.decode(text.as_bytes()).map_err(D::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
