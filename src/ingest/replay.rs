//! Stored image sequence replay.
//!
//! Replays a directory of stills in lexical filename order as if it were a
//! live feed, pacing each frame to a minimum inter-frame interval. Used for
//! deterministic offline runs against previously captured images; once the
//! sequence is exhausted the source reports so permanently and the monitor
//! loop shuts down.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

use super::{FrameSource, Grab};

/// Default minimum interval between replayed frames.
pub const REPLAY_INTERVAL: Duration = Duration::from_millis(100);

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Configuration for a replay source.
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Directory of still images.
    pub images: PathBuf,
    /// Minimum interval between frames.
    pub interval: Duration,
}

impl ReplayConfig {
    pub fn new(images: PathBuf) -> Self {
        Self {
            images,
            interval: REPLAY_INTERVAL,
        }
    }
}

/// Replay frame source.
pub struct ReplaySource {
    files: std::vec::IntoIter<PathBuf>,
    interval: Duration,
    last_frame_at: Option<Instant>,
}

impl ReplaySource {
    /// Scan and sort the image directory. An unreadable or empty directory
    /// is a construction error; replay without input is a config mistake.
    pub fn new(config: ReplayConfig) -> Result<Self> {
        let entries = std::fs::read_dir(&config.images)
            .with_context(|| format!("failed to read image directory {}", config.images.display()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image(path))
            .collect();
        if files.is_empty() {
            return Err(anyhow!(
                "no replay images found in {}",
                config.images.display()
            ));
        }
        files.sort();
        log::info!(
            "replaying {} images from {}",
            files.len(),
            config.images.display()
        );
        Ok(Self {
            files: files.into_iter(),
            interval: config.interval,
            last_frame_at: None,
        })
    }

    /// Hold back until the minimum inter-frame interval has passed.
    fn pace(&mut self) {
        if let Some(last) = self.last_frame_at {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_frame_at = Some(Instant::now());
    }
}

impl FrameSource for ReplaySource {
    fn grab(&mut self) -> Grab {
        let Some(path) = self.files.next() else {
            return Grab::Exhausted;
        };
        self.pace();
        match image::open(&path) {
            Ok(frame) => Grab::Frame(frame.to_rgb8()),
            Err(err) => {
                log::warn!("skipping undecodable image {}: {}", path.display(), err);
                Grab::Absent
            }
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}
