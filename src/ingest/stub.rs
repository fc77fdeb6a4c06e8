use std::collections::VecDeque;

use super::{FrameSource, Grab};

/// Scripted frame source for tests.
///
/// Yields a queued sequence of grabs, then reports exhaustion forever.
#[derive(Default)]
pub struct StubSource {
    script: VecDeque<Grab>,
}

impl StubSource {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Grab>,
    {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl FrameSource for StubSource {
    fn grab(&mut self) -> Grab {
        self.script.pop_front().unwrap_or(Grab::Exhausted)
    }
}
