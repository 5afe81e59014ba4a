//! End-to-end orchestrator tests against the in-memory store, local
//! storage, and a stub codec.

use anyhow::Result;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use vidmill_core::{
    OutputKind, ProcessingConfig, ProcessingOptions, ProcessingStatus, StepKind, StepStatus,
    UploadConfig,
};
use vidmill_db::InMemoryVideoStore;
use vidmill_engines::{EngineRegistry, ExtractiveSummarizer, FixtureTranscriber};
use vidmill_processing::codec::{MediaCodec, VideoProbe};
use vidmill_processing::{VideoOrchestrator, VideoUpload};
use vidmill_storage::{LocalStorage, Storage};

/// Codec stub: produces deterministic fixture artifacts without ffmpeg.
#[derive(Default)]
struct StubCodec {
    probe_fails: bool,
    frame_fails: bool,
    frames_fail: bool,
    silent_audio: bool,
}

#[async_trait]
impl MediaCodec for StubCodec {
    async fn probe(&self, _input: &Path) -> Result<VideoProbe> {
        if self.probe_fails {
            anyhow::bail!("probe unavailable");
        }
        Ok(VideoProbe {
            duration: Some(40.0),
            fps: Some(25.0),
            width: Some(640),
            height: Some(360),
            format: Some("mp4".to_string()),
        })
    }

    async fn extract_audio_pcm(&self, _input: &Path, sample_rate: u32) -> Result<Vec<i16>> {
        // One second of audio: silence, or a full-scale square wave.
        let len = sample_rate as usize;
        if self.silent_audio {
            Ok(vec![0; len])
        } else {
            Ok((0..len)
                .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
                .collect())
        }
    }

    async fn extract_audio_wav(&self, _input: &Path, output: &Path) -> Result<()> {
        tokio::fs::write(output, b"RIFF-stub-wav").await?;
        Ok(())
    }

    async fn encode_pcm_audio(
        &self,
        samples: &[i16],
        _sample_rate: u32,
        output: &Path,
    ) -> Result<()> {
        tokio::fs::write(output, format!("encoded:{}", samples.len())).await?;
        Ok(())
    }

    async fn apply_audio_filter(&self, _input: &Path, filter: &str, output: &Path) -> Result<()> {
        tokio::fs::write(output, format!("filtered:{}", filter)).await?;
        Ok(())
    }

    async fn extract_frame(&self, _input: &Path, at_secs: f64, output: &Path) -> Result<()> {
        if self.frame_fails {
            anyhow::bail!("frame extraction failed");
        }
        tokio::fs::write(output, format!("jpeg-at-{}", at_secs)).await?;
        Ok(())
    }

    async fn extract_frames(&self, _input: &Path, frames_dir: &Path) -> Result<Vec<PathBuf>> {
        if self.frames_fail {
            anyhow::bail!("frame dump failed");
        }
        tokio::fs::create_dir_all(frames_dir).await?;
        let mut frames = Vec::new();
        for i in 1..=2 {
            let path = frames_dir.join(format!("frame_{:06}.png", i));
            RgbImage::from_pixel(2, 2, Rgb([100, 100, 100])).save(&path)?;
            frames.push(path);
        }
        Ok(frames)
    }

    async fn assemble_video(
        &self,
        frames_dir: &Path,
        fps: f32,
        _audio_source: &Path,
        output: &Path,
    ) -> Result<()> {
        // Embed the first frame's pixel so tests can see the adjustment.
        let first = frames_dir.join("frame_000001.png");
        let img = image::open(&first)?.to_rgb8();
        let pixel = img.get_pixel(0, 0).0;
        tokio::fs::write(output, format!("assembled:{}:{:?}", fps, pixel)).await?;
        Ok(())
    }
}

struct TestHarness {
    orchestrator: VideoOrchestrator,
    store: Arc<InMemoryVideoStore>,
    storage: Arc<dyn Storage>,
    _storage_dir: TempDir,
}

async fn harness(codec: StubCodec, engines: EngineRegistry) -> TestHarness {
    harness_with_config(codec, engines, ProcessingConfig::default()).await
}

async fn harness_with_config(
    codec: StubCodec,
    engines: EngineRegistry,
    config: ProcessingConfig,
) -> TestHarness {
    let storage_dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(storage_dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap(),
    );
    let store = Arc::new(InMemoryVideoStore::new());

    let orchestrator = VideoOrchestrator::new(
        store.clone(),
        storage.clone(),
        Arc::new(codec),
        engines,
        &UploadConfig::default(),
        config,
    );

    TestHarness {
        orchestrator,
        store,
        storage,
        _storage_dir: storage_dir,
    }
}

fn all_engines() -> EngineRegistry {
    EngineRegistry::new()
        .with_transcriber(Arc::new(FixtureTranscriber::new()))
        .with_summarizer(Arc::new(ExtractiveSummarizer::new()))
}

/// Minimal MP4 signature the sniffer recognizes.
fn mp4_upload(name: &str) -> VideoUpload {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypmp42");
    data.extend_from_slice(&[0u8; 64]);
    VideoUpload {
        filename: name.to_string(),
        data,
    }
}

fn all_options() -> ProcessingOptions {
    ProcessingOptions {
        cut_silence: true,
        enhance_audio: true,
        generate_thumbnail: true,
        generate_subtitles: true,
        summarize: true,
        brightness: 150,
        contrast: 100,
        ..Default::default()
    }
}

fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    count += 1;
                }
            }
        }
    }
    count
}

#[tokio::test]
async fn test_non_video_upload_is_rejected_without_residue() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;

    let upload = VideoUpload {
        filename: "notes.txt".to_string(),
        data: b"just some text".to_vec(),
    };
    let result = h.orchestrator.save_video(upload, Uuid::new_v4()).await;

    assert!(result.is_err());
    assert_eq!(count_files(h._storage_dir.path()), 0);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_save_video_creates_pending_record_with_metadata() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;
    let owner = Uuid::new_v4();

    let id = h
        .orchestrator
        .save_video(mp4_upload("My Talk.mp4"), owner)
        .await
        .unwrap();

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.owner_id, owner);
    assert_eq!(record.status, ProcessingStatus::Pending);
    assert_eq!(record.original_filename, "My_Talk.mp4");
    assert_eq!(record.content_type, "video/mp4");
    assert_eq!(record.metadata.duration, Some(40.0));
    assert_eq!(record.metadata.resolution.as_deref(), Some("640x360"));
    assert!(h.storage.exists(&record.storage_key).await.unwrap());
}

#[tokio::test]
async fn test_probe_failure_degrades_to_format_only() {
    let h = harness(
        StubCodec {
            probe_fails: true,
            ..Default::default()
        },
        EngineRegistry::new(),
    )
    .await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.metadata.format, "mp4");
    assert_eq!(record.metadata.duration, None);
    assert_eq!(record.metadata.fps, None);
    assert_eq!(record.metadata.resolution, None);
}

#[tokio::test]
async fn test_full_run_completes_with_all_artifacts() {
    let h = harness(StubCodec::default(), all_engines()).await;
    let owner = Uuid::new_v4();

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), owner)
        .await
        .unwrap();
    let report = h
        .orchestrator
        .process_video(id, all_options())
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 6);
    for step in &report.steps {
        assert!(
            matches!(step.status, StepStatus::Succeeded { .. }),
            "step {:?} did not succeed: {:?}",
            step.step,
            step.status
        );
    }

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert!(record.process_started_at.is_some());
    assert!(record.process_ended_at.is_some());
    assert!(record.error.is_none());
    assert_eq!(record.options.as_ref().unwrap().brightness, 150);

    for kind in [
        OutputKind::ProcessedVideo,
        OutputKind::Thumbnail,
        OutputKind::Subtitles,
        OutputKind::SubtitlesJson,
        OutputKind::Summary,
    ] {
        let key = record.outputs.get(kind).unwrap_or_else(|| {
            panic!("missing output {:?}", kind);
        });
        assert!(h.storage.exists(key).await.unwrap(), "missing file for {:?}", kind);
    }

    // Pixel enhancement ran last, so the processed video is the assembled
    // one with brightness applied: 100 * 1.5 = 150.
    let processed = h
        .storage
        .download(record.outputs.get(OutputKind::ProcessedVideo).unwrap())
        .await
        .unwrap();
    let processed = String::from_utf8(processed).unwrap();
    assert!(processed.starts_with("assembled:25:"));
    assert!(processed.contains("[150, 150, 150]"));
}

#[tokio::test]
async fn test_subtitles_scale_to_double_for_forty_second_video() {
    let h = harness(StubCodec::default(), all_engines()).await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    h.orchestrator
        .process_video(
            id,
            ProcessingOptions {
                generate_subtitles: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();

    // duration 40 over a 20s script hits the 2.0 scaling cap.
    let srt = h
        .storage
        .download(record.outputs.get(OutputKind::Subtitles).unwrap())
        .await
        .unwrap();
    let srt = String::from_utf8(srt).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:08,000\n"));
    assert!(srt.contains("00:00:32,000 --> 00:00:40,000"));

    let doc: serde_json::Value = serde_json::from_slice(
        &h.storage
            .download(record.outputs.get(OutputKind::SubtitlesJson).unwrap())
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(doc["language"], "en");
    assert_eq!(doc["scale"], 2.0);
    assert_eq!(doc["segments"][4]["end"], 40.0);
}

#[tokio::test]
async fn test_best_effort_step_failure_does_not_fail_the_run() {
    let h = harness(
        StubCodec {
            frame_fails: true,
            ..Default::default()
        },
        all_engines(),
    )
    .await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    let report = h
        .orchestrator
        .process_video(
            id,
            ProcessingOptions {
                generate_thumbnail: true,
                generate_subtitles: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let thumbnail = report
        .steps
        .iter()
        .find(|s| s.step == StepKind::Thumbnail)
        .unwrap();
    assert!(matches!(thumbnail.status, StepStatus::Failed { .. }));

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert!(record.outputs.get(OutputKind::Thumbnail).is_none());
    assert!(record.outputs.get(OutputKind::Subtitles).is_some());
}

#[tokio::test]
async fn test_fatal_step_failure_fails_the_run_and_persists() {
    let h = harness(
        StubCodec {
            frames_fail: true,
            ..Default::default()
        },
        all_engines(),
    )
    .await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    let result = h
        .orchestrator
        .process_video(
            id,
            ProcessingOptions {
                generate_thumbnail: true,
                brightness: 150,
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_err());

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Failed);
    let error = record.error.as_deref().unwrap();
    assert!(error.contains("pixel_enhance"), "error was: {}", error);
    assert!(record.process_ended_at.is_some());
    // Earlier best-effort artifacts survive the failed run.
    assert!(record.outputs.get(OutputKind::Thumbnail).is_some());
}

#[tokio::test]
async fn test_fatal_failure_cancels_remaining_steps() {
    let mut config = ProcessingConfig::default();
    config.fatal_steps.insert(StepKind::Thumbnail);

    let h = harness_with_config(
        StubCodec {
            frame_fails: true,
            ..Default::default()
        },
        all_engines(),
        config,
    )
    .await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    let result = h
        .orchestrator
        .process_video(
            id,
            ProcessingOptions {
                generate_thumbnail: true,
                generate_subtitles: true,
                summarize: true,
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_err());
    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Failed);
    // Steps after the fatal thumbnail never produced artifacts.
    assert!(record.outputs.get(OutputKind::Subtitles).is_none());
    assert!(record.outputs.get(OutputKind::Summary).is_none());
}

#[tokio::test]
async fn test_missing_engines_skip_their_steps() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    let report = h
        .orchestrator
        .process_video(
            id,
            ProcessingOptions {
                generate_subtitles: true,
                summarize: true,
                generate_thumbnail: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for step in [StepKind::Subtitles, StepKind::Summarize] {
        let entry = report.steps.iter().find(|s| s.step == step).unwrap();
        assert!(
            matches!(entry.status, StepStatus::Skipped { .. }),
            "step {:?} was {:?}",
            step,
            entry.status
        );
    }

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert!(record.outputs.get(OutputKind::Thumbnail).is_some());
    assert!(record.outputs.get(OutputKind::Subtitles).is_none());
}

#[tokio::test]
async fn test_entirely_silent_audio_skips_silence_cut() {
    let h = harness(
        StubCodec {
            silent_audio: true,
            ..Default::default()
        },
        EngineRegistry::new(),
    )
    .await;

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), Uuid::new_v4())
        .await
        .unwrap();
    let report = h
        .orchestrator
        .process_video(
            id,
            ProcessingOptions {
                cut_silence: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        report.steps[0].status,
        StepStatus::Skipped { .. }
    ));
    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert!(record.outputs.is_empty());
}

#[tokio::test]
async fn test_process_unknown_video_is_not_found() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;
    let result = h
        .orchestrator
        .process_video(Uuid::new_v4(), ProcessingOptions::default())
        .await;
    assert!(matches!(
        result,
        Err(vidmill_core::AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_record_and_every_artifact() {
    let h = harness(StubCodec::default(), all_engines()).await;
    let owner = Uuid::new_v4();

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), owner)
        .await
        .unwrap();
    h.orchestrator
        .process_video(id, all_options())
        .await
        .unwrap();

    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    let mut keys: Vec<String> = record.outputs.keys().cloned().collect();
    keys.push(record.storage_key.clone());

    h.orchestrator.delete_video(id, owner).await.unwrap();

    assert!(h.orchestrator.get_video(id).await.unwrap().is_none());
    for key in keys {
        assert!(!h.storage.exists(&key).await.unwrap(), "file {} survived", key);
    }
    assert_eq!(count_files(h._storage_dir.path()), 0);
}

#[tokio::test]
async fn test_delete_as_non_owner_is_unauthorized_and_mutates_nothing() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;
    let owner = Uuid::new_v4();

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), owner)
        .await
        .unwrap();
    let files_before = count_files(h._storage_dir.path());

    let result = h.orchestrator.delete_video(id, Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(vidmill_core::AppError::Unauthorized(_))
    ));

    assert_eq!(count_files(h._storage_dir.path()), files_before);
    assert!(h.orchestrator.get_video(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_videos_by_owner() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;
    let owner = Uuid::new_v4();

    h.orchestrator
        .save_video(mp4_upload("one.mp4"), owner)
        .await
        .unwrap();
    h.orchestrator
        .save_video(mp4_upload("two.mp4"), owner)
        .await
        .unwrap();
    h.orchestrator
        .save_video(mp4_upload("other.mp4"), Uuid::new_v4())
        .await
        .unwrap();

    let videos = h.orchestrator.list_videos(owner).await.unwrap();
    assert_eq!(videos.len(), 2);
}

#[tokio::test]
async fn test_download_key_prefers_processed_video() {
    let h = harness(StubCodec::default(), EngineRegistry::new()).await;
    let owner = Uuid::new_v4();

    let id = h
        .orchestrator
        .save_video(mp4_upload("talk.mp4"), owner)
        .await
        .unwrap();

    // Before processing, the source is the downloadable artifact.
    let key = h.orchestrator.download_key(id, owner).await.unwrap();
    let record = h.orchestrator.get_video(id).await.unwrap().unwrap();
    assert_eq!(key, record.storage_key);

    h.orchestrator
        .process_video(
            id,
            ProcessingOptions {
                enhance_audio: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let key = h.orchestrator.download_key(id, owner).await.unwrap();
    assert!(key.ends_with("_enhanced_audio.mp4"));

    let result = h.orchestrator.download_key(id, Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(vidmill_core::AppError::Unauthorized(_))
    ));
}
