//! Canned transcription engine.
//!
//! Stands in for a real speech-to-text model: every audio input yields the
//! same fixed English script of timed segments, 20 seconds long in total.
//! The subtitle step stretches these timestamps to the actual video
//! duration.

use anyhow::Result;
use async_trait::async_trait;

use crate::engine::{Transcriber, Transcript, TranscriptSegment};

/// Total scripted length of the canned transcript, seconds.
pub const SCRIPT_DURATION_SECS: f64 = 20.0;

const SCRIPT: [(f64, f64, &str); 5] = [
    (0.0, 4.0, "Welcome to this video."),
    (4.0, 8.0, "Today we will walk through the main ideas step by step."),
    (8.0, 12.0, "Each section builds on the one before it."),
    (12.0, 16.0, "Along the way we will look at a few practical examples."),
    (16.0, 20.0, "Thanks for watching, and see you in the next one."),
];

/// Transcriber returning the fixed script regardless of input.
#[derive(Debug, Clone, Default)]
pub struct FixtureTranscriber;

impl FixtureTranscriber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcriber for FixtureTranscriber {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn transcribe(&self, _audio: &[u8]) -> Result<Transcript> {
        Ok(Transcript {
            language: "en".to_string(),
            segments: SCRIPT
                .iter()
                .map(|(start, end, text)| TranscriptSegment {
                    start: *start,
                    end: *end,
                    text: text.to_string(),
                })
                .collect(),
        })
    }
}
