//! Video processing orchestration: save → process sub-operations → persist.
//!
//! The orchestrator owns the lifecycle of a video record. `process_video`
//! runs the requested sub-operations in a fixed order and aggregates a
//! [`StepReport`] per step instead of letting individual steps decide what
//! to swallow; which failures are fatal comes from
//! [`ProcessingConfig::fatal_steps`]. Whatever happens, the record's
//! terminal state is persisted in a final step.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use vidmill_core::{
    AppError, OutputKind, ProcessingConfig, ProcessingOptions, ProcessingReport,
    ProcessingStatus, Stabilization, StepKind, StepReport, UploadConfig, VideoMetadata,
    VideoRecord,
};
use vidmill_db::VideoStore;
use vidmill_engines::EngineRegistry;
use vidmill_storage::{derived_key, Storage};

use crate::audio;
use crate::audio::SilenceConfig;
use crate::codec::MediaCodec;
use crate::enhance;
use crate::subtitles;
use crate::validator::{sanitize_filename, UploadValidator, ValidationError};

/// Sample rate for PCM work (silence analysis and re-encoding).
const PCM_SAMPLE_RATE: u32 = 16_000;

/// An upload handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Outcome of running a single step.
enum StepRun {
    Done(Vec<OutputKind>),
    Skipped(String),
}

/// Orchestrates the full video lifecycle against explicit dependencies:
/// document store, file store, codec toolchain, and AI engines.
pub struct VideoOrchestrator {
    store: Arc<dyn VideoStore>,
    storage: Arc<dyn Storage>,
    codec: Arc<dyn MediaCodec>,
    engines: EngineRegistry,
    validator: UploadValidator,
    config: ProcessingConfig,
}

impl VideoOrchestrator {
    pub fn new(
        store: Arc<dyn VideoStore>,
        storage: Arc<dyn Storage>,
        codec: Arc<dyn MediaCodec>,
        engines: EngineRegistry,
        upload_config: &UploadConfig,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            store,
            storage,
            codec,
            engines,
            validator: UploadValidator::new(upload_config),
            config,
        }
    }

    /// Validate and store an upload, probe its metadata, create its record.
    ///
    /// Validation happens before anything touches the file store, so a
    /// rejected upload leaves no residual file.
    pub async fn save_video(&self, upload: VideoUpload, owner_id: Uuid) -> Result<Uuid, AppError> {
        let content_type = self
            .validator
            .validate(&upload.filename, &upload.data)
            .map_err(validation_error)?;
        let original_filename = sanitize_filename(&upload.filename).map_err(validation_error)?;
        let stored_filename = unique_filename(&original_filename);
        let file_size = upload.data.len() as i64;

        let metadata = self.probe_metadata(&stored_filename, &upload.data).await;

        let storage_key = self
            .storage
            .upload(owner_id, &stored_filename, &content_type, upload.data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let record = VideoRecord::new(
            owner_id,
            stored_filename,
            original_filename,
            storage_key,
            content_type,
            file_size,
            metadata,
        );
        self.store.insert(&record).await?;

        tracing::info!(
            video_id = %record.id,
            owner_id = %owner_id,
            size_bytes = file_size,
            "Video uploaded"
        );

        Ok(record.id)
    }

    /// Run the requested sub-operations against a stored video.
    ///
    /// Status moves Pending/whatever → Processing → Completed or Failed
    /// exactly once, and the record is persisted at the end regardless of
    /// outcome. Concurrent calls for the same record are unguarded; the
    /// last final persist wins.
    pub async fn process_video(
        &self,
        id: Uuid,
        options: ProcessingOptions,
    ) -> Result<ProcessingReport, AppError> {
        let mut record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        record.status = ProcessingStatus::Processing;
        record.process_started_at = Some(Utc::now());
        record.process_ended_at = None;
        record.error = None;
        record.options = Some(options.clone());
        self.store.update(&record).await?;

        tracing::info!(video_id = %id, "Video processing started");

        let outcome = self.run_pipeline(&mut record, &options).await;

        record.process_ended_at = Some(Utc::now());
        let result = match outcome {
            Ok((report, None)) => {
                record.status = ProcessingStatus::Completed;
                tracing::info!(
                    video_id = %id,
                    outputs = record.outputs.len(),
                    "Video processing completed"
                );
                Ok(report)
            }
            Ok((_, Some(message))) => {
                record.status = ProcessingStatus::Failed;
                record.error = Some(message.clone());
                tracing::error!(video_id = %id, error = %message, "Video processing failed");
                Err(AppError::MediaProcessing(message))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                record.status = ProcessingStatus::Failed;
                record.error = Some(message.clone());
                tracing::error!(video_id = %id, error = %message, "Video processing failed");
                Err(AppError::MediaProcessing(message))
            }
        };

        // Final persist happens on every path so no run leaves the record
        // stuck at Processing.
        if let Err(persist_err) = self.store.update(&record).await {
            tracing::error!(
                video_id = %id,
                error = %persist_err,
                "Failed to persist record after processing run"
            );
            if result.is_ok() {
                return Err(persist_err);
            }
        }

        result
    }

    pub async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.store.get(id).await
    }

    pub async fn list_videos(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        self.store.list_by_owner(owner_id).await
    }

    /// Resolve the downloadable artifact for a video: the processed video
    /// when one exists, the source otherwise.
    pub async fn download_key(&self, id: Uuid, owner_id: Uuid) -> Result<String, AppError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        if record.owner_id != owner_id {
            return Err(AppError::Unauthorized(
                "Not the owner of this video".to_string(),
            ));
        }

        let key = record.download_key().to_string();
        match self.storage.exists(&key).await {
            Ok(true) => Ok(key),
            Ok(false) => Err(AppError::NotFound(format!("File {} not found", key))),
            Err(e) => Err(AppError::Storage(e.to_string())),
        }
    }

    /// Delete a record along with its source file and every derived
    /// artifact. The ownership check runs before any filesystem mutation.
    pub async fn delete_video(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        if record.owner_id != owner_id {
            return Err(AppError::Unauthorized(
                "Not the owner of this video".to_string(),
            ));
        }

        self.storage
            .delete(&record.storage_key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        for key in record.outputs.keys() {
            self.storage
                .delete(key)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }

        self.store.delete(id).await?;
        tracing::info!(video_id = %id, "Video deleted");
        Ok(())
    }

    /// Probe duration/fps/resolution/format. Best-effort: on failure only
    /// the format (from the extension) survives.
    async fn probe_metadata(&self, filename: &str, data: &[u8]) -> VideoMetadata {
        let format = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let probed = async {
            let dir = TempDir::new().context("Failed to create temp directory")?;
            let path = dir.path().join(filename);
            tokio::fs::write(&path, data)
                .await
                .context("Failed to write probe input")?;
            self.codec.probe(&path).await
        }
        .await;

        match probed {
            Ok(probe) => VideoMetadata {
                duration: probe.duration,
                fps: probe.fps,
                resolution: match (probe.width, probe.height) {
                    (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
                    _ => None,
                },
                format: if format.is_empty() {
                    probe.format.unwrap_or_default()
                } else {
                    format
                },
            },
            Err(e) => {
                tracing::warn!(error = %e, "Metadata probe failed, keeping format only");
                VideoMetadata {
                    format,
                    ..Default::default()
                }
            }
        }
    }

    async fn run_pipeline(
        &self,
        record: &mut VideoRecord,
        options: &ProcessingOptions,
    ) -> Result<(ProcessingReport, Option<String>)> {
        let workdir = TempDir::new().context("Failed to create temp directory")?;
        let input_path = workdir.path().join(&record.filename);

        let source = self
            .storage
            .download(&record.storage_key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch source from storage: {}", e))?;
        tokio::fs::write(&input_path, source)
            .await
            .context("Failed to write source to temp file")?;

        let mut report = ProcessingReport::default();
        let mut fatal: Option<String> = None;

        for step in StepKind::ORDER {
            if !step_requested(options, step) {
                continue;
            }
            if fatal.is_some() {
                report.push(StepReport::skipped(step, "cancelled by earlier fatal failure"));
                continue;
            }

            match self
                .run_step(step, record, options, &input_path, workdir.path())
                .await
            {
                Ok(StepRun::Done(outputs)) => {
                    tracing::info!(video_id = %record.id, step = %step, "Step completed");
                    report.push(StepReport::succeeded(step, outputs));
                }
                Ok(StepRun::Skipped(reason)) => {
                    tracing::info!(video_id = %record.id, step = %step, reason = %reason, "Step skipped");
                    report.push(StepReport::skipped(step, reason));
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    tracing::warn!(video_id = %record.id, step = %step, error = %reason, "Step failed");
                    if self.config.fatal_steps.contains(&step) {
                        fatal = Some(format!("{}: {}", step, reason));
                    }
                    report.push(StepReport::failed(step, reason));
                }
            }
        }

        Ok((report, fatal))
    }

    async fn run_step(
        &self,
        step: StepKind,
        record: &mut VideoRecord,
        options: &ProcessingOptions,
        input: &Path,
        workdir: &Path,
    ) -> Result<StepRun> {
        match step {
            StepKind::CutSilence => self.step_cut_silence(record, input, workdir).await,
            StepKind::EnhanceAudio => self.step_enhance_audio(record, options, input, workdir).await,
            StepKind::Thumbnail => self.step_thumbnail(record, input, workdir).await,
            StepKind::Subtitles => self.step_subtitles(record, input).await,
            StepKind::Summarize => self.step_summarize(record, input, workdir).await,
            StepKind::PixelEnhance => {
                self.step_pixel_enhance(record, options, input, workdir).await
            }
        }
    }

    async fn step_cut_silence(
        &self,
        record: &mut VideoRecord,
        input: &Path,
        workdir: &Path,
    ) -> Result<StepRun> {
        let samples = self.codec.extract_audio_pcm(input, PCM_SAMPLE_RATE).await?;
        let silence_config = SilenceConfig::from(&self.config);
        let kept = audio::cut_silence(&samples, PCM_SAMPLE_RATE, &silence_config);
        if kept.is_empty() {
            return Ok(StepRun::Skipped("audio track is entirely silent".to_string()));
        }

        let out = workdir.join("silence_cut.mp4");
        self.codec
            .encode_pcm_audio(&kept, PCM_SAMPLE_RATE, &out)
            .await?;
        self.store_artifact(
            record,
            OutputKind::ProcessedVideo,
            "_processed",
            "mp4",
            "video/mp4",
            &out,
        )
        .await?;
        Ok(StepRun::Done(vec![OutputKind::ProcessedVideo]))
    }

    async fn step_enhance_audio(
        &self,
        record: &mut VideoRecord,
        options: &ProcessingOptions,
        input: &Path,
        workdir: &Path,
    ) -> Result<StepRun> {
        let filter = audio::filter_chain(options.audio_enhancement);
        let out = workdir.join("enhanced_audio.mp4");
        self.codec.apply_audio_filter(input, filter, &out).await?;
        self.store_artifact(
            record,
            OutputKind::ProcessedVideo,
            "_enhanced_audio",
            "mp4",
            "video/mp4",
            &out,
        )
        .await?;
        Ok(StepRun::Done(vec![OutputKind::ProcessedVideo]))
    }

    async fn step_thumbnail(
        &self,
        record: &mut VideoRecord,
        input: &Path,
        workdir: &Path,
    ) -> Result<StepRun> {
        let midpoint = record.metadata.duration.map(|d| d / 2.0).unwrap_or(0.0);
        let out = workdir.join("thumbnail.jpg");
        self.codec.extract_frame(input, midpoint, &out).await?;
        self.store_artifact(
            record,
            OutputKind::Thumbnail,
            "_thumb",
            "jpg",
            "image/jpeg",
            &out,
        )
        .await?;
        Ok(StepRun::Done(vec![OutputKind::Thumbnail]))
    }

    async fn step_subtitles(&self, record: &mut VideoRecord, input: &Path) -> Result<StepRun> {
        let Some(transcriber) = self.engines.transcriber() else {
            return Ok(StepRun::Skipped(
                "no transcription engine registered".to_string(),
            ));
        };

        let transcript = self.transcribe(transcriber.as_ref(), input).await?;
        let scale = subtitles::time_scale(record.metadata.duration, transcript.scripted_duration());
        let segments = subtitles::scale_segments(&transcript.segments, scale);
        let srt = subtitles::render_srt(&segments);
        let document = subtitles::build_document(&transcript, scale);

        let srt_key = derived_key(&record.storage_key, "", "srt");
        self.storage
            .upload_with_key(&srt_key, srt.into_bytes(), "application/x-subrip")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store subtitles: {}", e))?;
        self.record_output(record, OutputKind::Subtitles, srt_key).await;

        let json_key = derived_key(&record.storage_key, "_subtitles", "json");
        self.storage
            .upload_with_key(
                &json_key,
                serde_json::to_vec_pretty(&document)?,
                "application/json",
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store subtitle document: {}", e))?;
        self.record_output(record, OutputKind::SubtitlesJson, json_key)
            .await;

        Ok(StepRun::Done(vec![
            OutputKind::Subtitles,
            OutputKind::SubtitlesJson,
        ]))
    }

    async fn step_summarize(
        &self,
        record: &mut VideoRecord,
        input: &Path,
        _workdir: &Path,
    ) -> Result<StepRun> {
        let (Some(transcriber), Some(summarizer)) =
            (self.engines.transcriber(), self.engines.summarizer())
        else {
            return Ok(StepRun::Skipped(
                "transcription and summarization engines are both required".to_string(),
            ));
        };

        let transcript = self.transcribe(transcriber.as_ref(), input).await?;
        let text = transcript.full_text();
        if text.trim().is_empty() {
            return Ok(StepRun::Skipped("transcription produced no text".to_string()));
        }

        let summary = summarizer
            .summarize(
                &text,
                self.config.summary_max_words,
                self.config.summary_min_words,
            )
            .await?;

        let key = derived_key(&record.storage_key, "_summary", "txt");
        self.storage
            .upload_with_key(&key, summary.into_bytes(), "text/plain")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store summary: {}", e))?;
        self.record_output(record, OutputKind::Summary, key).await;

        Ok(StepRun::Done(vec![OutputKind::Summary]))
    }

    async fn step_pixel_enhance(
        &self,
        record: &mut VideoRecord,
        options: &ProcessingOptions,
        input: &Path,
        workdir: &Path,
    ) -> Result<StepRun> {
        let brightness = options.brightness as f64 / 100.0;
        let contrast = options.contrast as f64 / 100.0;

        if options.stabilization != Stabilization::None {
            // Placeholder: frames pass through unchanged.
            tracing::debug!(video_id = %record.id, "Stabilization requested, passing frames through");
        }

        let frames_dir = workdir.join("frames");
        let frames = self.codec.extract_frames(input, &frames_dir).await?;
        if frames.is_empty() {
            anyhow::bail!("No frames decoded from source");
        }

        if brightness != 1.0 || contrast != 1.0 {
            for frame in &frames {
                let mut img = image::open(frame)
                    .with_context(|| format!("Failed to decode frame {}", frame.display()))?
                    .to_rgb8();
                enhance::adjust_image(&mut img, brightness, contrast);
                img.save(frame)
                    .with_context(|| format!("Failed to write frame {}", frame.display()))?;
            }
        }

        let fps = record.metadata.fps.unwrap_or(30.0);
        let out = workdir.join("enhanced.mp4");
        self.codec
            .assemble_video(&frames_dir, fps, input, &out)
            .await?;
        self.store_artifact(
            record,
            OutputKind::ProcessedVideo,
            "_enhanced",
            "mp4",
            "video/mp4",
            &out,
        )
        .await?;
        Ok(StepRun::Done(vec![OutputKind::ProcessedVideo]))
    }

    /// Extract the audio track and run it through the transcriber.
    async fn transcribe(
        &self,
        transcriber: &dyn vidmill_engines::Transcriber,
        input: &Path,
    ) -> Result<vidmill_engines::Transcript> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        let wav = dir.path().join("audio.wav");
        self.codec.extract_audio_wav(input, &wav).await?;
        let audio_bytes = tokio::fs::read(&wav)
            .await
            .context("Failed to read extracted audio")?;
        transcriber.transcribe(&audio_bytes).await
    }

    /// Upload a produced file under a key derived from the source and
    /// record it in the output map.
    async fn store_artifact(
        &self,
        record: &mut VideoRecord,
        kind: OutputKind,
        suffix: &str,
        extension: &str,
        content_type: &str,
        path: &Path,
    ) -> Result<()> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let key = derived_key(&record.storage_key, suffix, extension);
        self.storage
            .upload_with_key(&key, data, content_type)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store artifact {}: {}", key, e))?;
        self.record_output(record, kind, key).await;
        Ok(())
    }

    /// Record an artifact key on the record; a superseded key of the same
    /// kind (a later step replacing the processed video) is removed from
    /// storage so the output map stays the full inventory of derived files.
    async fn record_output(&self, record: &mut VideoRecord, kind: OutputKind, key: String) {
        if let Some(old) = record.outputs.insert(kind, key.clone()) {
            if old != key {
                if let Err(e) = self.storage.delete(&old).await {
                    tracing::warn!(key = %old, error = %e, "Failed to remove superseded artifact");
                }
            }
        }
    }
}

fn step_requested(options: &ProcessingOptions, step: StepKind) -> bool {
    match step {
        StepKind::CutSilence => options.cut_silence,
        StepKind::EnhanceAudio => options.enhance_audio,
        StepKind::Thumbnail => options.generate_thumbnail,
        StepKind::Subtitles => options.generate_subtitles,
        StepKind::Summarize => options.summarize,
        StepKind::PixelEnhance => options.wants_pixel_enhancement(),
    }
}

/// Storage filename: the sanitized original plus a short unique tag.
fn unique_filename(original: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    let tag = &tag[..8];
    match original.rsplit_once('.') {
        Some((stem, extension)) => format!("{}_{}.{}", stem, tag, extension),
        None => format!("{}_{}", original, tag),
    }
}

fn validation_error(err: ValidationError) -> AppError {
    match err {
        ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
        _ => AppError::InvalidInput(err.to_string()),
    }
}
