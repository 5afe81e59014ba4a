//! Vidmill Processing Library
//!
//! Upload validation, the ffmpeg codec seam, the sub-operation
//! implementations (silence cutting, audio enhancement, thumbnail,
//! subtitles, summarization, pixel enhancement), and the
//! [`VideoOrchestrator`] that drives them.

pub mod audio;
pub mod codec;
pub mod enhance;
pub mod orchestrator;
pub mod subtitles;
pub mod validator;

pub use codec::{FfmpegCodec, MediaCodec, VideoProbe};
pub use orchestrator::{VideoOrchestrator, VideoUpload};
pub use validator::{UploadValidator, ValidationError};
