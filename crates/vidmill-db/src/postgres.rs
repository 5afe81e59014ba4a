//! Postgres-backed video store.
//!
//! Nested documents (metadata, options, outputs) live in JSONB columns so
//! the record round-trips as stored, without a column per field.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use vidmill_core::{AppError, ProcessingStatus, VideoRecord};

use crate::store::VideoStore;

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    owner_id: Uuid,
    filename: String,
    original_filename: String,
    storage_key: String,
    content_type: String,
    file_size: i64,
    metadata: JsonValue,
    status: ProcessingStatus,
    options: Option<JsonValue>,
    outputs: JsonValue,
    process_started_at: Option<DateTime<Utc>>,
    process_ended_at: Option<DateTime<Utc>>,
    error: Option<String>,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VideoRow {
    fn into_record(self) -> Result<VideoRecord, AppError> {
        Ok(VideoRecord {
            id: self.id,
            owner_id: self.owner_id,
            filename: self.filename,
            original_filename: self.original_filename,
            storage_key: self.storage_key,
            content_type: self.content_type,
            file_size: self.file_size,
            metadata: serde_json::from_value(self.metadata)?,
            status: self.status,
            options: self.options.map(serde_json::from_value).transpose()?,
            outputs: serde_json::from_value(self.outputs)?,
            process_started_at: self.process_started_at,
            process_ended_at: self.process_ended_at,
            error: self.error,
            uploaded_at: self.uploaded_at,
            updated_at: self.updated_at,
        })
    }
}

/// Video record repository over Postgres.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the bundled migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "videos", video_id = %record.id))]
    async fn insert(&self, record: &VideoRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_id, filename, original_filename, storage_key,
                content_type, file_size, metadata, status, options, outputs,
                process_started_at, process_ended_at, error, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.filename)
        .bind(&record.original_filename)
        .bind(&record.storage_key)
        .bind(&record.content_type)
        .bind(record.file_size)
        .bind(serde_json::to_value(&record.metadata)?)
        .bind(record.status)
        .bind(record.options.as_ref().map(serde_json::to_value).transpose()?)
        .bind(serde_json::to_value(&record.outputs)?)
        .bind(record.process_started_at)
        .bind(record.process_ended_at)
        .bind(&record.error)
        .bind(record.uploaded_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row: Option<VideoRow> =
            sqlx::query_as::<Postgres, VideoRow>("SELECT * FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(VideoRow::into_record).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let rows: Vec<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            "SELECT * FROM videos WHERE owner_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VideoRow::into_record).collect()
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "videos", video_id = %record.id))]
    async fn update(&self, record: &VideoRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE videos SET
                metadata = $2, status = $3, options = $4, outputs = $5,
                process_started_at = $6, process_ended_at = $7, error = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(serde_json::to_value(&record.metadata)?)
        .bind(record.status)
        .bind(record.options.as_ref().map(serde_json::to_value).transpose()?)
        .bind(serde_json::to_value(&record.outputs)?)
        .bind(record.process_started_at)
        .bind(record.process_ended_at)
        .bind(&record.error)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
