//! Subtitle generation from a transcript.
//!
//! The transcript's scripted timeline is stretched to the actual video
//! duration when the video runs longer than the script, capped at 2x so a
//! long recording does not smear a few lines across minutes of footage.
//! Output comes in two shapes: line-based SRT and a structured JSON
//! document.

use serde::{Deserialize, Serialize};

use vidmill_engines::{Transcript, TranscriptSegment};

/// Maximum stretch applied to scripted timestamps.
pub const MAX_TIME_SCALE: f64 = 2.0;

/// Structured subtitle document stored alongside the SRT file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleDocument {
    pub language: String,
    /// Stretch factor applied to the scripted timestamps.
    pub scale: f64,
    pub segments: Vec<TranscriptSegment>,
}

/// Stretch factor for a video of `duration` against a script of
/// `scripted_secs`. Never shrinks, caps at [`MAX_TIME_SCALE`], and stays
/// neutral when either length is unknown.
pub fn time_scale(duration: Option<f64>, scripted_secs: f64) -> f64 {
    match duration {
        Some(d) if scripted_secs > 0.0 && d > scripted_secs => {
            (d / scripted_secs).min(MAX_TIME_SCALE)
        }
        _ => 1.0,
    }
}

/// Apply a stretch factor to every segment timestamp.
pub fn scale_segments(segments: &[TranscriptSegment], scale: f64) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .map(|s| TranscriptSegment {
            start: s.start * scale,
            end: s.end * scale,
            text: s.text.clone(),
        })
        .collect()
}

/// Render segments as SRT.
pub fn render_srt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text
        ));
    }
    out
}

/// Build the structured document for a scaled transcript.
pub fn build_document(transcript: &Transcript, scale: f64) -> SubtitleDocument {
    SubtitleDocument {
        language: transcript.language.clone(),
        scale,
        segments: scale_segments(&transcript.segments, scale),
    }
}

/// SRT timestamp: `HH:MM:SS,mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
