//! Published process state.
//!
//! The detection result is exposed to the control system as a set of named
//! slots: `x`, `y`, `w`, `h`, `score`, `label`, `status`. External readers
//! must consult `status` before trusting the position fields; an invalid
//! cycle zeroes the score but deliberately leaves the last-known geometry
//! in place so downstream displays do not flicker.

use std::sync::{Arc, RwLock};

use crate::detect::Detection;

/// Whether the current cycle produced a detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    Valid,
    #[default]
    Invalid,
}

/// One coherent snapshot of the published slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusRecord {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub score: f32,
    pub label: String,
    pub status: Status,
}

/// Publication capability handed to the monitor loop at construction.
pub trait Publisher: Send {
    /// Publish this cycle's result, or the absence of one.
    fn publish(&self, detection: Option<&Detection>);
}

/// Shared status slots.
///
/// Cloning yields another handle onto the same slots. The monitor loop is
/// the only writer; any number of readers may take snapshots concurrently.
/// Each publication is applied under a single write lock so a reader never
/// observes a valid status paired with fields from a different cycle.
#[derive(Clone, Default)]
pub struct StatusBoard {
    slots: Arc<RwLock<StatusRecord>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coherent copy of the current slots.
    pub fn snapshot(&self) -> StatusRecord {
        match self.slots.read() {
            Ok(slots) => slots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Publisher for StatusBoard {
    fn publish(&self, detection: Option<&Detection>) {
        let mut slots = match self.slots.write() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        match detection {
            Some(detection) => {
                slots.x = detection.x;
                slots.y = detection.y;
                slots.w = detection.w;
                slots.h = detection.h;
                slots.score = detection.score;
                slots.label = detection.label.clone();
                slots.status = Status::Valid;
            }
            None => {
                slots.score = 0.0;
                slots.status = Status::Invalid;
            }
        }
    }
}
