//! aicenterd - AI sample-detection daemon
//!
//! This daemon:
//! 1. Loads the model assets and builds the detection adapter
//! 2. Pulls frames from the live camera feed (or a stored-image replay)
//! 3. Runs the detection loop on a dedicated worker thread
//! 4. Publishes the best detection per cycle to the status slots
//! 5. Shuts down cleanly on SIGINT/SIGTERM or replay exhaustion

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use aicenter::{
    Config, Detector, FrameSource, LiveConfig, LiveSource, LoopState, Mode, Monitor, ReplayConfig,
    ReplaySource, Selector, StatusBoard, StubDetector,
};
#[cfg(feature = "backend-darknet")]
use aicenter::{DarknetDetector, ModelAssets};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "aicenterd", version, about = "AI sample detection service")]
struct Args {
    /// Device name for this service instance.
    #[arg(long, env = "AICENTER_DEVICE")]
    device: String,

    /// Path to the model assets directory, or stub:// for the scripted
    /// detector.
    #[arg(long, env = "AICENTER_MODEL", default_value = "/cmcf_apps/ai-centering/model")]
    model: PathBuf,

    /// Camera server address (host or host:port). Required for live
    /// operation.
    #[arg(long, env = "AICENTER_SERVER")]
    server: Option<String>,

    /// Camera feed identifier. Required for live operation.
    #[arg(long, env = "AICENTER_CAMERA")]
    camera: Option<String>,

    /// Directory of still images to replay instead of the live feed.
    #[arg(long, env = "AICENTER_IMAGES", conflicts_with_all = ["server", "camera"])]
    images: Option<PathBuf>,

    /// Confidence threshold override (defaults per mode).
    #[arg(long)]
    conf_thresh: Option<f32>,

    /// Suppression threshold override (defaults per mode).
    #[arg(long)]
    nms_thresh: Option<f32>,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::resolve(
        args.device,
        args.model,
        args.server,
        args.camera,
        args.images,
        args.conf_thresh,
        args.nms_thresh,
    )?;
    log::info!(
        "device={:?}, model={:?}, mode={:?}",
        config.device,
        config.model_dir,
        config.mode
    );

    let (detector, class_names) = build_detector(&config.model_dir)?;
    let selector = Selector::new(class_names, config.conf_thresh, config.nms_thresh);
    let source: Box<dyn FrameSource> = match &config.mode {
        Mode::Live { server, camera } => Box::new(LiveSource::new(LiveConfig {
            server: server.clone(),
            camera: camera.clone(),
        })?),
        Mode::Replay { images } => Box::new(ReplaySource::new(ReplayConfig::new(images.clone()))?),
    };

    let board = StatusBoard::new();
    let mut monitor = Monitor::spawn(detector, source, selector, board.clone());
    log::info!("{} running", config.device);

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .context("failed to install signal handler")?;
    }

    let mut last_health_log = Instant::now();
    while monitor.state() == LoopState::Running && !interrupted.load(Ordering::SeqCst) {
        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let snapshot = board.snapshot();
            log::debug!(
                "status={:?} label={:?} score={:.2}",
                snapshot.status,
                snapshot.label,
                snapshot.score
            );
            last_health_log = Instant::now();
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    monitor.stop();
    log::info!("shutdown complete");
    Ok(())
}

/// Build the inference adapter for the configured model path.
///
/// The `stub://` scheme selects the scripted detector so a build without
/// the native backend still runs end-to-end.
fn build_detector(model_dir: &Path) -> Result<(Box<dyn Detector>, Vec<String>)> {
    if model_dir.to_string_lossy().starts_with("stub://") {
        log::info!("using scripted stub detector");
        return Ok((Box::new(StubDetector::new()), Vec::new()));
    }

    #[cfg(feature = "backend-darknet")]
    {
        let assets = ModelAssets::load(model_dir)?;
        log::info!(
            "loaded {} classes from {}",
            assets.class_names.len(),
            model_dir.display()
        );
        let detector = DarknetDetector::load(&assets)?;
        Ok((Box::new(detector), assets.class_names))
    }
    #[cfg(not(feature = "backend-darknet"))]
    {
        Err(anyhow::anyhow!(
            "model inference requires the backend-darknet feature"
        ))
    }
}
