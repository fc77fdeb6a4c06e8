//! aicenter
//!
//! Continuous sample detection for beamline cameras. The crate watches a
//! live video feed, runs a single-object detector over each frame, and
//! publishes the single highest-confidence detection as readable process
//! state for the control system. It runs unattended, tolerates transient
//! frame loss, and always exposes a defined status (valid detection or
//! none) rather than stale or undefined data.
//!
//! # Module Structure
//!
//! - `detect`: model assets and inference adapters (darknet via OpenCV dnn,
//!   scripted stub)
//! - `ingest`: frame sources (live keyed store, stored-image replay, stub)
//! - `select`: confidence filtering, duplicate suppression, best-candidate
//!   selection
//! - `status`: the published status slots
//! - `monitor`: the detection loop and its lifecycle
//! - `config`: startup configuration

pub mod config;
pub mod detect;
pub mod ingest;
pub mod monitor;
pub mod select;
pub mod status;

pub use config::{Config, Mode};
#[cfg(feature = "backend-darknet")]
pub use detect::DarknetDetector;
pub use detect::{Detection, Detector, ModelAssets, RawCandidate, StubDetector};
pub use ingest::{FrameSource, Grab, LiveConfig, LiveSource, ReplayConfig, ReplaySource, StubSource};
pub use monitor::{LoopState, Monitor};
pub use select::Selector;
pub use status::{Publisher, Status, StatusBoard, StatusRecord};
