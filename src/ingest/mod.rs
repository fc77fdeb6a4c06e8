//! Frame sources.
//!
//! This module provides the sources the monitor loop pulls frames from:
//! - the live camera feed, read from a keyed frame store
//! - a deterministic replay of a stored image sequence
//! - a scripted stub source (testing)
//!
//! All sources expose the same capability: a single `grab` returning the
//! most recent frame, a transient miss, or permanent exhaustion. Sources
//! never mutate external state beyond the read itself, and a malformed
//! frame always degrades to a miss rather than an error.

use image::RgbImage;

mod live;
mod replay;
mod stub;

pub use live::{LiveConfig, LiveSource};
pub use replay::{ReplayConfig, ReplaySource};
pub use stub::StubSource;

/// Outcome of one frame fetch.
#[derive(Debug)]
pub enum Grab {
    /// A decoded frame.
    Frame(RgbImage),
    /// No frame this cycle; the feed may recover.
    Absent,
    /// The source will never produce another frame.
    Exhausted,
}

/// Frame acquisition capability.
///
/// Live feed and replay are interchangeable implementations selected at
/// construction; the monitor loop is the only caller after that.
pub trait FrameSource: Send {
    /// Fetch the most recent frame.
    fn grab(&mut self) -> Grab;
}

impl FrameSource for Box<dyn FrameSource> {
    fn grab(&mut self) -> Grab {
        (**self).grab()
    }
}
