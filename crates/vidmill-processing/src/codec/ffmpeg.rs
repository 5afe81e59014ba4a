//! ffmpeg/ffprobe subprocess codec.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{MediaCodec, VideoProbe};
use vidmill_core::FfmpegConfig;

/// Frame filename pattern used for extract/assemble round trips.
const FRAME_PATTERN: &str = "frame_%06d.png";

/// [`MediaCodec`] backed by the ffmpeg and ffprobe binaries.
#[derive(Clone)]
pub struct FfmpegCodec {
    ffmpeg_path: String,
    ffprobe_path: String,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
}

/// Parse an ffprobe rational like "30000/1001" into frames per second.
fn parse_frame_rate(raw: &str) -> Option<f32> {
    let mut parts = raw.splitn(2, '/');
    let num: f32 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(den) => {
            let den: f32 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => Some(num),
    }
}

impl FfmpegCodec {
    pub fn new(config: &FfmpegConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    /// Run ffmpeg with `args`, failing with captured stderr on non-zero exit.
    async fn run_ffmpeg(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-y")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", self.ffmpeg_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no output")
            );
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaCodec for FfmpegCodec {
    async fn probe(&self, input: &Path) -> Result<VideoProbe> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", self.ffprobe_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no output")
            );
        }

        let probe: FfprobeOutput =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

        let video_stream = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));

        Ok(VideoProbe {
            duration: probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse().ok()),
            fps: video_stream
                .and_then(|s| s.avg_frame_rate.as_deref())
                .and_then(parse_frame_rate),
            width: video_stream.and_then(|s| s.width),
            height: video_stream.and_then(|s| s.height),
            format: probe
                .format
                .as_ref()
                .and_then(|f| f.format_name.as_ref())
                .map(|f| f.split(',').next().unwrap_or(f).to_string()),
        })
    }

    async fn extract_audio_pcm(&self, input: &Path, sample_rate: u32) -> Result<Vec<i16>> {
        let rate = sample_rate.to_string();
        let input_str = input.to_string_lossy();
        let stdout = self
            .run_ffmpeg(&[
                "-i", &input_str, "-vn", "-ac", "1", "-ar", &rate, "-f", "s16le", "-acodec",
                "pcm_s16le", "pipe:1",
            ])
            .await
            .context("Failed to decode audio track to PCM")?;

        Ok(stdout
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    async fn extract_audio_wav(&self, input: &Path, output: &Path) -> Result<()> {
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        self.run_ffmpeg(&["-i", &input_str, "-vn", "-ac", "1", &output_str])
            .await
            .context("Failed to extract audio track to WAV")?;
        Ok(())
    }

    async fn encode_pcm_audio(
        &self,
        samples: &[i16],
        sample_rate: u32,
        output: &Path,
    ) -> Result<()> {
        let rate = sample_rate.to_string();
        let output_str = output.to_string_lossy();

        let mut child = Command::new(&self.ffmpeg_path)
            .args([
                "-hide_banner", "-y", "-f", "s16le", "-ar", &rate, "-ac", "1", "-i", "pipe:0",
                "-c:a", "aac", &output_str,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.ffmpeg_path))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Failed to open ffmpeg stdin")?;
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        stdin.write_all(&bytes).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no output")
            );
        }
        Ok(())
    }

    async fn apply_audio_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()> {
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        self.run_ffmpeg(&[
            "-i", &input_str, "-af", filter, "-c:v", "copy", &output_str,
        ])
        .await
        .with_context(|| format!("Failed to apply audio filter '{}'", filter))?;
        Ok(())
    }

    async fn extract_frame(&self, input: &Path, at_secs: f64, output: &Path) -> Result<()> {
        let at = format!("{:.3}", at_secs);
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        self.run_ffmpeg(&[
            "-ss", &at, "-i", &input_str, "-frames:v", "1", "-q:v", "2", &output_str,
        ])
        .await
        .with_context(|| format!("Failed to extract frame at {}s", at))?;
        Ok(())
    }

    async fn extract_frames(&self, input: &Path, frames_dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(frames_dir).await?;

        let input_str = input.to_string_lossy();
        let pattern = frames_dir.join(FRAME_PATTERN);
        let pattern_str = pattern.to_string_lossy();
        self.run_ffmpeg(&["-i", &input_str, &pattern_str])
            .await
            .context("Failed to extract frames")?;

        let mut frames = Vec::new();
        let mut entries = tokio::fs::read_dir(frames_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("png") {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }

    async fn assemble_video(
        &self,
        frames_dir: &Path,
        fps: f32,
        audio_source: &Path,
        output: &Path,
    ) -> Result<()> {
        let framerate = format!("{}", fps);
        let pattern = frames_dir.join(FRAME_PATTERN);
        let pattern_str = pattern.to_string_lossy();
        let audio_str = audio_source.to_string_lossy();
        let output_str = output.to_string_lossy();

        self.run_ffmpeg(&[
            "-framerate",
            &framerate,
            "-i",
            &pattern_str,
            "-i",
            &audio_str,
            "-map",
            "0:v",
            "-map",
            "1:a?",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
            &output_str,
        ])
        .await
        .context("Failed to assemble video from frames")?;
        Ok(())
    }
}
