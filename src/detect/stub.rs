use std::collections::VecDeque;

use anyhow::Result;
use image::RgbImage;

use crate::detect::result::RawCandidate;
use crate::detect::Detector;

/// Scripted detector for tests and the `stub://` model scheme.
///
/// Returns one queued candidate set per frame, then empty sets once the
/// script is exhausted.
#[derive(Default)]
pub struct StubDetector {
    script: VecDeque<Vec<RawCandidate>>,
}

impl StubDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue candidate sets to return, one per `infer` call.
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Vec<RawCandidate>>,
    {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl Detector for StubDetector {
    fn infer(&mut self, _frame: &RgbImage) -> Result<Vec<RawCandidate>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}
