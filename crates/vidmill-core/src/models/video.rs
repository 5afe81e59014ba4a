use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::options::ProcessingOptions;
use super::outputs::OutputMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "processing_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessingStatus::Pending => write!(f, "pending"),
            ProcessingStatus::Processing => write!(f, "processing"),
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Technical metadata probed from the uploaded file.
///
/// The probe is best-effort: when ffprobe fails only `format` (taken from the
/// file extension) is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub duration: Option<f64>,
    pub fps: Option<f32>,
    pub resolution: Option<String>,
    pub format: String,
}

/// A video document: upload facts, probe metadata, and processing state.
///
/// Created on upload, mutated throughout a processing run, persisted after
/// each run regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub storage_key: String,
    pub content_type: String,
    pub file_size: i64,
    pub metadata: VideoMetadata,
    pub status: ProcessingStatus,
    pub options: Option<ProcessingOptions>,
    pub outputs: OutputMap,
    pub process_started_at: Option<DateTime<Utc>>,
    pub process_ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Build a fresh record for a just-stored upload.
    pub fn new(
        owner_id: Uuid,
        filename: String,
        original_filename: String,
        storage_key: String,
        content_type: String,
        file_size: i64,
        metadata: VideoMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            filename,
            original_filename,
            storage_key,
            content_type,
            file_size,
            metadata,
            status: ProcessingStatus::Pending,
            options: None,
            outputs: OutputMap::new(),
            process_started_at: None,
            process_ended_at: None,
            error: None,
            uploaded_at: now,
            updated_at: now,
        }
    }

    /// Storage key of the processed video, falling back to the source object.
    pub fn download_key(&self) -> &str {
        self.outputs
            .get(super::outputs::OutputKind::ProcessedVideo)
            .unwrap_or(&self.storage_key)
    }
}

/// Client-facing view of a record.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub metadata: VideoMetadata,
    pub status: ProcessingStatus,
    pub outputs: OutputMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(record: VideoRecord) -> Self {
        VideoResponse {
            id: record.id,
            filename: record.original_filename,
            content_type: record.content_type,
            file_size: record.file_size,
            metadata: record.metadata,
            status: record.status,
            outputs: record.outputs,
            error: record.error,
            uploaded_at: record.uploaded_at,
        }
    }
}
