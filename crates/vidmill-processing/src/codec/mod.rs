//! Codec seam: everything that needs ffmpeg/ffprobe goes through
//! [`MediaCodec`] so the pipeline can be exercised without the binaries.

pub mod ffmpeg;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use ffmpeg::FfmpegCodec;

/// Probe result for a media file. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProbe {
    pub duration: Option<f64>,
    pub fps: Option<f32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

/// Decode/encode operations the pipeline needs from the codec toolchain.
///
/// Implementations work on files: inputs and outputs are paths inside the
/// orchestrator's per-run temp directory.
#[async_trait]
pub trait MediaCodec: Send + Sync {
    /// Probe container/stream metadata.
    async fn probe(&self, input: &Path) -> Result<VideoProbe>;

    /// Decode the audio track to mono signed 16-bit PCM at `sample_rate`.
    async fn extract_audio_pcm(&self, input: &Path, sample_rate: u32) -> Result<Vec<i16>>;

    /// Extract the audio track as a mono WAV file.
    async fn extract_audio_wav(&self, input: &Path, output: &Path) -> Result<()>;

    /// Encode mono PCM samples as an AAC audio file.
    async fn encode_pcm_audio(
        &self,
        samples: &[i16],
        sample_rate: u32,
        output: &Path,
    ) -> Result<()>;

    /// Re-encode `input` with an audio filter chain applied; the video
    /// stream is copied untouched.
    async fn apply_audio_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()>;

    /// Grab a single frame at `at_secs` as JPEG.
    async fn extract_frame(&self, input: &Path, at_secs: f64, output: &Path) -> Result<()>;

    /// Dump every frame of `input` as numbered PNGs into `frames_dir`.
    /// Returns the frame paths in display order.
    async fn extract_frames(&self, input: &Path, frames_dir: &Path) -> Result<Vec<PathBuf>>;

    /// Assemble numbered PNGs back into a video at `fps`, muxing the audio
    /// track of `audio_source` when it has one.
    async fn assemble_video(
        &self,
        frames_dir: &Path,
        fps: f32,
        audio_source: &Path,
        output: &Path,
    ) -> Result<()>;
}
