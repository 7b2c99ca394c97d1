use crate::{
    domain::PhotoRepository,
    errors::RepoError,
    models::{NewPhoto, Photo},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use std::{str::FromStr, time::Duration};
use tracing::{self, info};

/// Busy timeout applied to every SQLite connection.
const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqlitePhotoRepository {
    pool: SqlitePool,
}

impl SqlitePhotoRepository {
    /// Parses `database_url` into connection options. The file is created if missing.
    pub fn connect_options(database_url: &str) -> anyhow::Result<SqliteConnectOptions> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL '{}'", database_url))?
            .create_if_missing(true)
            .busy_timeout(SQLITE_BUSY_TIMEOUT);
        Ok(options)
    }

    /// Opens (creating if missing) the database at `database_url` and runs migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        Self::connect_with(Self::connect_options(database_url)?, max_connections).await
    }

    pub async fn connect_with(options: SqliteConnectOptions, max_connections: u32) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to photo database")?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database. It lives on a single connection that is
    /// never recycled, otherwise each new connection would see an empty database.
    pub async fn connect_in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Initializing SqlitePhotoRepository");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PhotoRepository for SqlitePhotoRepository {
    /// Inserts the photo with a single INSERT; the row id becomes the photo id.
    async fn create(&self, photo: NewPhoto) -> Result<Photo, RepoError> {
        let uploaded_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO photos (filename, content_type, image_data, description, upload_timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&photo.filename)
        .bind(&photo.content_type)
        .bind(&photo.image_data)
        .bind(&photo.description)
        .bind(uploaded_at)
        .execute(&self.pool)
        .await
        .context(format!("SQLite: Failed to insert photo '{}'", photo.filename))
        .map_err(RepoError::BackendError)?;

        let id = result.last_insert_rowid();
        tracing::debug!(photo_id = id, filename = %photo.filename, "SQLite: Photo inserted");
        Ok(Photo::from_parts(id, photo, uploaded_at))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Photo>, RepoError> {
        let row = sqlx::query(
            "SELECT id, filename, content_type, image_data, description, upload_timestamp FROM photos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("SQLite: Failed to get photo (id: {})", id))
        .map_err(RepoError::BackendError)?;

        row.map(|row| row_to_photo(&row)).transpose()
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(&self.pool)
            .await
            .context("SQLite: Failed to count photos")
            .map_err(RepoError::BackendError)?;
        Ok(count)
    }
}

fn row_to_photo(row: &SqliteRow) -> Result<Photo, RepoError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| RepoError::DataCorruption(format!("<unknown id>: {}", e)))?;
    let corrupt = |e: sqlx::Error| RepoError::DataCorruption(format!("{}: {}", id, e));

    let draft = NewPhoto {
        filename: row.try_get("filename").map_err(corrupt)?,
        content_type: row.try_get("content_type").map_err(corrupt)?,
        image_data: row.try_get("image_data").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
    };
    let uploaded_at: DateTime<Utc> = row.try_get("upload_timestamp").map_err(corrupt)?;

    Ok(Photo::from_parts(id, draft, uploaded_at))
}
