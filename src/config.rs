use std::{env, net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;

/// Default ceiling on decoded image size (10 MB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Configuration for the storage service process.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub max_image_bytes: usize,
}

/// Configuration for the upload service process.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub bind_address: SocketAddr,
    /// Base URL of the storage service, e.g. `http://localhost:8081`.
    pub storage_service_url: String,
    pub forward_timeout: Duration,
    pub max_image_bytes: usize,
}

/// Configuration for the client. A missing URL is not an error here; the form
/// stays disabled instead.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub upload_service_url: Option<String>,
}

impl StorageConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(StorageConfig {
            bind_address: parse_or(&lookup, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 8081)))?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://photos.db".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            max_image_bytes: parse_or(&lookup, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
        })
    }
}

impl UploadConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_service_url = lookup("PHOTO_STORAGE_SERVICE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("PHOTO_STORAGE_SERVICE_URL".into()))?;
        reqwest::Url::parse(&storage_service_url)
            .map_err(|e| ConfigError::InvalidVar("PHOTO_STORAGE_SERVICE_URL".into(), e.to_string()))?;

        let timeout_secs: u64 = parse_or(&lookup, "FORWARD_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidVar(
                "FORWARD_TIMEOUT_SECS".into(),
                "timeout must be at least one second".into(),
            ));
        }

        Ok(UploadConfig {
            bind_address: parse_or(&lookup, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            storage_service_url: storage_service_url.trim_end_matches('/').to_string(),
            forward_timeout: Duration::from_secs(timeout_secs),
            max_image_bytes: parse_or(&lookup, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
        })
    }
}

impl ClientConfig {
    /// Reads the upload URL; an explicit value (e.g. from the command line) wins.
    pub fn load(explicit_url: Option<String>) -> Self {
        dotenvy::dotenv().ok();
        let upload_service_url = explicit_url
            .or_else(|| env::var("PHOTO_UPLOAD_SERVICE_URL").ok())
            .filter(|url| reqwest::Url::parse(url).is_ok());
        ClientConfig { upload_service_url }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => T::from_str(raw.trim()).map_err(|e| ConfigError::InvalidVar(key.into(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn storage_defaults() {
        let config = StorageConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.bind_address.port(), 8081);
        assert_eq!(config.database_url, "sqlite://photos.db");
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn upload_requires_storage_url() {
        let err = UploadConfig::from_lookup(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref name) if name == "PHOTO_STORAGE_SERVICE_URL"));
    }

    #[test]
    fn upload_trims_trailing_slash_and_reads_timeout() {
        let config = UploadConfig::from_lookup(vars(&[
            ("PHOTO_STORAGE_SERVICE_URL", "http://storage:8081/"),
            ("FORWARD_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.storage_service_url, "http://storage:8081");
        assert_eq!(config.forward_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = UploadConfig::from_lookup(vars(&[
            ("PHOTO_STORAGE_SERVICE_URL", "http://storage:8081"),
            ("FORWARD_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar(..)));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = StorageConfig::from_lookup(vars(&[("BIND_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar(ref name, _) if name == "BIND_ADDRESS"));
    }

    #[test]
    fn client_drops_unparseable_url() {
        let config = ClientConfig::load(Some("not a url".to_string()));
        assert_eq!(config.upload_service_url, None);
    }
}
