//! Vidmill Engines Library
//!
//! Pluggable AI capabilities for the processing pipeline. The orchestrator
//! depends on the [`Transcriber`] and [`Summarizer`] traits through an
//! [`EngineRegistry`]; a capability exists exactly when an engine is
//! registered for it, so "model unavailable" is a registry state rather
//! than a nullable field inside the orchestrator.

pub mod engine;
pub mod extractive;
pub mod fixture;
pub mod registry;

pub use engine::{Summarizer, Transcriber, Transcript, TranscriptSegment};
pub use extractive::ExtractiveSummarizer;
pub use fixture::FixtureTranscriber;
pub use registry::EngineRegistry;
