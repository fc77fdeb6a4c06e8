use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

const NAMES_FILE: &str = "yolov3.names";
const CONFIG_FILE: &str = "yolov3.cfg";
const WEIGHTS_FILE: &str = "yolov3.weights";

/// Model assets loaded once at startup and immutable for the process
/// lifetime. `RawCandidate::class_id` indexes into `class_names`.
#[derive(Clone, Debug)]
pub struct ModelAssets {
    pub weights: PathBuf,
    pub config: PathBuf,
    pub class_names: Vec<String>,
}

impl ModelAssets {
    /// Load the darknet asset triplet from a model directory.
    ///
    /// Any missing or malformed asset is a fatal startup error; the process
    /// must not start without a usable model. The class count declared in
    /// the network config must match the names file, which is what
    /// guarantees a candidate's class id always indexes validly at runtime.
    pub fn load(dir: &Path) -> Result<Self> {
        let names_path = dir.join(NAMES_FILE);
        let config = dir.join(CONFIG_FILE);
        let weights = dir.join(WEIGHTS_FILE);

        let raw = fs::read_to_string(&names_path)
            .with_context(|| format!("failed to read class names {}", names_path.display()))?;
        let class_names: Vec<String> = raw
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();
        if class_names.is_empty() {
            return Err(anyhow!("class names file {} is empty", names_path.display()));
        }

        for path in [&config, &weights] {
            if !path.is_file() {
                return Err(anyhow!("missing model asset {}", path.display()));
            }
        }

        if let Some(declared) = declared_class_count(&config)? {
            if declared != class_names.len() {
                return Err(anyhow!(
                    "network config declares {} classes but {} lists {}",
                    declared,
                    names_path.display(),
                    class_names.len()
                ));
            }
        }

        Ok(Self {
            weights,
            config,
            class_names,
        })
    }
}

/// Extract the `classes=` count from a darknet network config.
///
/// The value appears once per detection head; darknet requires them to
/// agree, so the first occurrence is taken.
fn declared_class_count(config: &Path) -> Result<Option<usize>> {
    let raw = fs::read_to_string(config)
        .with_context(|| format!("failed to read network config {}", config.display()))?;
    for line in raw.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if let Some(value) = line.strip_prefix("classes") {
            if let Some(value) = value.trim_start().strip_prefix('=') {
                let count: usize = value
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid classes= value in {}", config.display()))?;
                return Ok(Some(count));
            }
        }
    }
    Ok(None)
}
