//! Vidmill Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across all vidmill components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, FfmpegConfig, ProcessingConfig, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AudioEnhancement, OutputKind, OutputMap, ProcessingOptions, ProcessingReport,
    ProcessingStatus, Stabilization, StepKind, StepReport, StepStatus, VideoMetadata, VideoRecord,
    VideoResponse,
};
