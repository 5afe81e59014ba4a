//! Engine traits and the transcript types they exchange.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One timed segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    /// Segment start, seconds from the beginning of the audio.
    pub start: f64,
    /// Segment end, seconds.
    pub end: f64,
    pub text: String,
}

/// A transcription result: language plus timed segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    /// BCP-47 language tag (e.g. "en").
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// End timestamp of the last segment; the scripted length of the
    /// transcript in seconds.
    pub fn scripted_duration(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// All segment text joined with spaces.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Speech-to-text capability.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Engine name, for logging and registry listings.
    fn name(&self) -> &str;

    /// Transcribe an audio track (WAV bytes) into timed segments.
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcript>;
}

/// Text summarization capability.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize `text` into roughly `min_words..=max_words` words.
    async fn summarize(&self, text: &str, max_words: usize, min_words: usize) -> Result<String>;
}
