//! Engine registry: which AI capabilities this deployment actually has.

use std::sync::Arc;

use crate::engine::{Summarizer, Transcriber};

/// Registered engines, built once at startup and handed to the orchestrator.
///
/// A capability is present exactly when an engine was registered for it;
/// the processing steps that need a missing capability report themselves as
/// skipped instead of failing.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    transcriber: Option<Arc<dyn Transcriber>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl EngineRegistry {
    /// An empty registry: no transcription, no summarization.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        tracing::info!(engine = %transcriber.name(), "Registered transcription engine");
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        tracing::info!(engine = %summarizer.name(), "Registered summarization engine");
        self.summarizer = Some(summarizer);
        self
    }

    pub fn transcriber(&self) -> Option<&Arc<dyn Transcriber>> {
        self.transcriber.as_ref()
    }

    pub fn summarizer(&self) -> Option<&Arc<dyn Summarizer>> {
        self.summarizer.as_ref()
    }

    pub fn has_transcription(&self) -> bool {
        self.transcriber.is_some()
    }

    pub fn has_summarization(&self) -> bool {
        self.summarizer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractive::ExtractiveSummarizer;
    use crate::fixture::FixtureTranscriber;

    #[test]
    fn test_empty_registry_has_no_capabilities() {
        let registry = EngineRegistry::new();
        assert!(!registry.has_transcription());
        assert!(!registry.has_summarization());
        assert!(registry.transcriber().is_none());
    }

    #[test]
    fn test_registration_enables_capability() {
        let registry = EngineRegistry::new()
            .with_transcriber(Arc::new(FixtureTranscriber::new()))
            .with_summarizer(Arc::new(ExtractiveSummarizer::new()));

        assert!(registry.has_transcription());
        assert!(registry.has_summarization());
        assert_eq!(registry.transcriber().unwrap().name(), "fixture");
        assert_eq!(registry.summarizer().unwrap().name(), "extractive");
    }
}
