//! Configuration module
//!
//! Configuration for storage, upload validation, external tooling, and
//! processing behavior, read from the environment with sensible defaults.

use std::collections::HashSet;
use std::env;

use crate::models::StepKind;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;
const DEFAULT_SILENCE_THRESHOLD_DBFS: f64 = -40.0;
const DEFAULT_SILENCE_CHUNK_MS: u64 = 10_000;
const DEFAULT_MIN_SILENCE_MS: u64 = 500;
const DEFAULT_SUMMARY_MAX_WORDS: usize = 130;
const DEFAULT_SUMMARY_MIN_WORDS: usize = 30;

/// File-store configuration.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Root directory for stored media.
    pub root: String,
    /// Base URL files are served from.
    pub base_url: String,
}

/// Upload validation configuration.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

/// Paths to the external codec binaries.
#[derive(Clone, Debug)]
pub struct FfmpegConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

/// Processing-run behavior.
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    /// Chunks at or below this loudness are dropped by silence cutting.
    pub silence_threshold_dbfs: f64,
    /// Length of the chunks silence cutting evaluates.
    pub silence_chunk_ms: u64,
    /// Minimum silence length worth acting on.
    pub min_silence_ms: u64,
    /// Summary word bounds passed to the summarization engine.
    pub summary_max_words: usize,
    pub summary_min_words: usize,
    /// Steps whose failure fails the whole run. All other steps are
    /// best-effort: their failures are recorded and the run continues.
    pub fatal_steps: HashSet<StepKind>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub ffmpeg: FfmpegConfig,
    pub processing: ProcessingConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list_or(key: &str, default: &[&str]) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| default.iter().map(|s| s.to_string()).collect())
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: [
                "video/mp4",
                "video/x-msvideo",
                "video/quicktime",
                "video/x-matroska",
                "video/x-ms-wmv",
                "video/x-flv",
                "video/webm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            silence_threshold_dbfs: DEFAULT_SILENCE_THRESHOLD_DBFS,
            silence_chunk_ms: DEFAULT_SILENCE_CHUNK_MS,
            min_silence_ms: DEFAULT_MIN_SILENCE_MS,
            summary_max_words: DEFAULT_SUMMARY_MAX_WORDS,
            summary_min_words: DEFAULT_SUMMARY_MIN_WORDS,
            fatal_steps: [StepKind::PixelEnhance].into_iter().collect(),
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment. `.env` files are honored via
    /// dotenvy before any variable is read.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let upload_defaults = UploadConfig::default();
        let processing_defaults = ProcessingConfig::default();

        let fatal_steps = match env::var("VIDMILL_FATAL_STEPS") {
            Ok(raw) => parse_fatal_steps(&raw)?,
            Err(_) => processing_defaults.fatal_steps,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            storage: StorageConfig {
                root: env_or("VIDMILL_STORAGE_ROOT", "uploads"),
                base_url: env_or("VIDMILL_STORAGE_BASE_URL", "http://localhost:3000/media"),
            },
            upload: UploadConfig {
                max_file_size_bytes: env_parse_or(
                    "VIDMILL_MAX_UPLOAD_BYTES",
                    upload_defaults.max_file_size_bytes,
                ),
                allowed_extensions: env_list_or(
                    "VIDMILL_ALLOWED_EXTENSIONS",
                    &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"],
                ),
                allowed_content_types: upload_defaults.allowed_content_types,
            },
            ffmpeg: FfmpegConfig {
                ffmpeg_path: env_or("VIDMILL_FFMPEG_PATH", "ffmpeg"),
                ffprobe_path: env_or("VIDMILL_FFPROBE_PATH", "ffprobe"),
            },
            processing: ProcessingConfig {
                silence_threshold_dbfs: env_parse_or(
                    "VIDMILL_SILENCE_THRESHOLD_DBFS",
                    processing_defaults.silence_threshold_dbfs,
                ),
                silence_chunk_ms: env_parse_or(
                    "VIDMILL_SILENCE_CHUNK_MS",
                    processing_defaults.silence_chunk_ms,
                ),
                min_silence_ms: env_parse_or(
                    "VIDMILL_MIN_SILENCE_MS",
                    processing_defaults.min_silence_ms,
                ),
                summary_max_words: processing_defaults.summary_max_words,
                summary_min_words: processing_defaults.summary_min_words,
                fatal_steps,
            },
        })
    }
}

fn parse_fatal_steps(raw: &str) -> Result<HashSet<StepKind>, anyhow::Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            StepKind::ORDER
                .into_iter()
                .find(|k| k.as_str() == name)
                .ok_or_else(|| anyhow::anyhow!("Unknown step in VIDMILL_FATAL_STEPS: {}", name))
        })
        .collect()
}
