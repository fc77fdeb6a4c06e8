//! Detection model adapters.
//!
//! The network itself is an opaque capability: given a decoded frame it
//! returns one raw candidate per spatial/anchor position the model
//! evaluates. Everything downstream (thresholding, suppression, selection)
//! lives in [`crate::select`].

use anyhow::Result;
use image::RgbImage;

mod assets;
#[cfg(feature = "backend-darknet")]
mod darknet;
mod result;
mod stub;

pub use assets::ModelAssets;
#[cfg(feature = "backend-darknet")]
pub use darknet::DarknetDetector;
pub use result::{Detection, RawCandidate};
pub use stub::StubDetector;

/// Opaque inference capability.
///
/// Implementations convert a decoded frame into candidate boxes in
/// source-image pixel space. They must not threshold or suppress
/// candidates; that is the selector's job.
pub trait Detector: Send {
    /// Run the model over one frame.
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawCandidate>>;
}

impl Detector for Box<dyn Detector> {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawCandidate>> {
        (**self).infer(frame)
    }
}
