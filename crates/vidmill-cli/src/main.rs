//! Vidmill CLI — drive the video processing orchestrator from the shell.
//!
//! With DATABASE_URL set, records persist in Postgres; otherwise an
//! in-memory store backs the run (useful for trying out a pipeline on a
//! local file). Files land under VIDMILL_STORAGE_ROOT.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

use vidmill_cli::init_tracing;
use vidmill_core::{AudioEnhancement, Config, ProcessingOptions, Stabilization, VideoResponse};
use vidmill_db::{InMemoryVideoStore, PgVideoStore, VideoStore};
use vidmill_engines::{EngineRegistry, ExtractiveSummarizer, FixtureTranscriber};
use vidmill_processing::{FfmpegCodec, VideoOrchestrator, VideoUpload};
use vidmill_storage::create_storage;

#[derive(Parser)]
#[command(name = "vidmill", about = "Video processing orchestrator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video file
    Upload {
        /// Path to the video file
        file: std::path::PathBuf,
        /// Owner id the record belongs to
        #[arg(long, env = "VIDMILL_OWNER")]
        owner: Uuid,
    },
    /// Run processing steps against an uploaded video
    Process {
        /// Video UUID
        id: Uuid,
        /// Cut silent stretches out of the audio track
        #[arg(long)]
        cut_silence: bool,
        /// Enhance the audio track
        #[arg(long)]
        enhance_audio: bool,
        /// Enhancement profile: clear, music, or full
        #[arg(long, default_value = "full")]
        audio_enhancement: String,
        /// Extract a midpoint thumbnail
        #[arg(long)]
        thumbnail: bool,
        /// Generate subtitles (SRT + JSON document)
        #[arg(long)]
        subtitles: bool,
        /// Generate a plain-text summary
        #[arg(long)]
        summarize: bool,
        /// Brightness percentage (100 = unchanged)
        #[arg(long, default_value = "100")]
        brightness: u32,
        /// Contrast percentage (100 = unchanged)
        #[arg(long, default_value = "100")]
        contrast: u32,
        /// Stabilization mode: none or standard
        #[arg(long, default_value = "none")]
        stabilization: String,
    },
    /// Show a video record
    Get {
        /// Video UUID
        id: Uuid,
    },
    /// List an owner's videos
    List {
        #[arg(long, env = "VIDMILL_OWNER")]
        owner: Uuid,
    },
    /// Resolve the downloadable artifact for a video
    Download {
        /// Video UUID
        id: Uuid,
        #[arg(long, env = "VIDMILL_OWNER")]
        owner: Uuid,
    },
    /// Delete a video, its source file, and every derived artifact
    Delete {
        /// Video UUID
        id: Uuid,
        #[arg(long, env = "VIDMILL_OWNER")]
        owner: Uuid,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn parse_enhancement(raw: &str) -> anyhow::Result<AudioEnhancement> {
    match raw {
        "clear" => Ok(AudioEnhancement::Clear),
        "music" => Ok(AudioEnhancement::Music),
        "full" => Ok(AudioEnhancement::Full),
        other => anyhow::bail!("Unknown audio enhancement '{}' (clear, music, full)", other),
    }
}

fn parse_stabilization(raw: &str) -> anyhow::Result<Stabilization> {
    match raw {
        "none" => Ok(Stabilization::None),
        "standard" => Ok(Stabilization::Standard),
        other => anyhow::bail!("Unknown stabilization '{}' (none, standard)", other),
    }
}

async fn build_orchestrator(config: &Config) -> anyhow::Result<VideoOrchestrator> {
    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage")?;

    let store: Arc<dyn VideoStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            let store = PgVideoStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records will not persist beyond this run");
            Arc::new(InMemoryVideoStore::new())
        }
    };

    let codec = Arc::new(FfmpegCodec::new(&config.ffmpeg));
    let engines = EngineRegistry::new()
        .with_transcriber(Arc::new(FixtureTranscriber::new()))
        .with_summarizer(Arc::new(ExtractiveSummarizer::new()));

    Ok(VideoOrchestrator::new(
        store,
        storage,
        codec,
        engines,
        &config.upload,
        config.processing.clone(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let orchestrator = build_orchestrator(&config).await?;

    match cli.command {
        Commands::Upload { file, owner } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("Invalid file path")?
                .to_string();
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let id = orchestrator
                .save_video(VideoUpload { filename, data }, owner)
                .await?;
            let record = orchestrator
                .get_video(id)
                .await?
                .context("Record vanished after upload")?;
            print_json(&VideoResponse::from(record))?;
        }
        Commands::Process {
            id,
            cut_silence,
            enhance_audio,
            audio_enhancement,
            thumbnail,
            subtitles,
            summarize,
            brightness,
            contrast,
            stabilization,
        } => {
            let options = ProcessingOptions {
                cut_silence,
                enhance_audio,
                audio_enhancement: parse_enhancement(&audio_enhancement)?,
                generate_thumbnail: thumbnail,
                generate_subtitles: subtitles,
                summarize,
                stabilization: parse_stabilization(&stabilization)?,
                brightness,
                contrast,
            };
            let report = orchestrator.process_video(id, options).await?;
            print_json(&report)?;
        }
        Commands::Get { id } => {
            let record = orchestrator
                .get_video(id)
                .await?
                .with_context(|| format!("Video {} not found", id))?;
            print_json(&VideoResponse::from(record))?;
        }
        Commands::List { owner } => {
            let records = orchestrator.list_videos(owner).await?;
            let responses: Vec<VideoResponse> =
                records.into_iter().map(VideoResponse::from).collect();
            print_json(&responses)?;
        }
        Commands::Download { id, owner } => {
            let key = orchestrator.download_key(id, owner).await?;
            println!("{}", key);
        }
        Commands::Delete { id, owner } => {
            orchestrator.delete_video(id, owner).await?;
            println!("deleted {}", id);
        }
    }

    Ok(())
}
