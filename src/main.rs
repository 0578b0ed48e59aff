// REFLEX Viz Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use reflex_viz::config::{OutputTarget, Settings, VisualizationConfig, DEFAULT_JPEG_QUALITY};
use reflex_viz::render::{MemorySink, RerunSink, SessionSummary, Sink, Visualizer};
use reflex_viz::{telemetry, ParticipantCode};

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "reflex-viz")]
#[command(about = "Visualize a REFLEX participant session", long_about = None)]
struct Cli {
    /// Participant code, e.g. C1-4 or D2-11
    #[arg(short, long)]
    participant: String,

    /// Stop after this many frames
    #[arg(long, default_value_t = 18_000)]
    max_frames: u64,

    /// JPEG quality for camera frames (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Dataset root holding the condition folders
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Show 3D face landmarks
    #[arg(long)]
    face_3d: bool,

    /// Show 3D gaze vectors
    #[arg(long)]
    gaze_3d: bool,

    /// Show 3D body joints
    #[arg(long)]
    body_3d: bool,

    /// Minimum OpenFace confidence for face and gaze overlays (0.0-1.0)
    #[arg(long, default_value_t = 0.7, value_parser = parse_confidence)]
    openface_confidence: f64,

    /// Directory with failure description images
    #[arg(long)]
    visuals_dir: Option<PathBuf>,

    /// Write a .rrd recording instead of spawning a viewer
    #[arg(long, conflicts_with = "dry_run")]
    save: Option<PathBuf>,

    /// Render into memory and print what would be shown
    #[arg(long)]
    dry_run: bool,

    /// Debug-level logging
    #[arg(long)]
    debug: bool,

    /// Log file (appended)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0-1.0", value))
    }
}

fn build_config(args: &Cli, settings: &Settings) -> Result<VisualizationConfig> {
    let participant: ParticipantCode = args.participant.parse()?;
    let root = args.data_path.clone().or_else(|| settings.data_root.clone());

    let mut config = VisualizationConfig::resolve(participant, root)?;
    config.max_frames = args.max_frames;
    config.jpeg_quality = args.jpeg_quality;
    config.face_3d = args.face_3d;
    config.gaze_3d = args.gaze_3d;
    config.body_3d = args.body_3d;
    config.openface_confidence = args.openface_confidence;
    config.visuals_dir = args
        .visuals_dir
        .clone()
        .unwrap_or_else(|| settings.visuals_dir.clone());
    config.output = match (&args.save, args.dry_run) {
        (_, true) => OutputTarget::DryRun,
        (Some(path), false) => OutputTarget::Save(path.clone()),
        (None, false) => OutputTarget::Spawn,
    };

    config.validate()?;
    Ok(config)
}

fn render<S: Sink>(config: VisualizationConfig, sink: S) -> Result<(SessionSummary, S)> {
    let participant = config.participant;
    let mut visualizer = Visualizer::new(config, sink);
    let summary = visualizer
        .run()
        .with_context(|| format!("Visualization failed for participant {}", participant))?;
    Ok((summary, visualizer.into_sink()))
}

fn main() -> Result<()> {
    dotenv().ok();
    let settings = Settings::from_env();
    let args = Cli::parse();

    let log_file = args.log_file.clone().unwrap_or_else(|| settings.log_file.clone());
    telemetry::init(args.debug, &log_file);
    telemetry::install_panic_hook();

    info!("--- REFLEX VIZ v{} ---", env!("CARGO_PKG_VERSION"));

    let config = match build_config(&args, &settings) {
        Ok(config) => config,
        Err(e) => {
            error!("[VIZ] {:#}", e);
            return Err(e);
        }
    };
    info!("[VIZ] Participant {} -> {:?}", config.participant, config.data_path);

    let app_id = config.recording_id();
    let summary = match config.output.clone() {
        OutputTarget::Spawn => render(config, RerunSink::spawn(&app_id)?)?.0,
        OutputTarget::Save(path) => {
            let sink = RerunSink::save(&app_id, &path)
                .with_context(|| format!("Could not create recording {:?}", path))?;
            render(config, sink)?.0
        }
        OutputTarget::DryRun => {
            let (summary, sink) = render(config, MemorySink::new())?;
            for (entity, count) in sink.counts() {
                println!("{:<28} {}", entity, count);
            }
            summary
        }
    };

    info!(
        "[VIZ] Finished: {} frames, last index {:?}, {:?}",
        summary.frames, summary.last_index, summary.mode
    );
    Ok(())
}
