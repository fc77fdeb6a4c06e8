//! Candidate post-processing.
//!
//! Reduces a raw candidate tensor to at most one detection: confidence
//! filtering, greedy duplicate suppression over the whole candidate set,
//! then best-survivor selection. Suppression is applied across classes
//! pooled together, so a box of one class can suppress an overlapping box
//! of another when its confidence and overlap qualify it.

use std::cmp::Ordering;

use crate::detect::{Detection, RawCandidate};

/// Confidence floor for live operation.
pub const LIVE_CONF_THRESH: f32 = 0.5;
/// Suppression overlap threshold for live operation.
pub const LIVE_NMS_THRESH: f32 = 0.5;
/// Looser confidence floor for offline replay tuning.
pub const REPLAY_CONF_THRESH: f32 = 0.25;
/// Looser suppression threshold for offline replay tuning.
pub const REPLAY_NMS_THRESH: f32 = 0.25;

/// Selects the single best detection from a raw candidate set.
#[derive(Clone, Debug)]
pub struct Selector {
    class_names: Vec<String>,
    conf_thresh: f32,
    nms_thresh: f32,
}

impl Selector {
    pub fn new(class_names: Vec<String>, conf_thresh: f32, nms_thresh: f32) -> Self {
        Self {
            class_names,
            conf_thresh,
            nms_thresh,
        }
    }

    /// Selector with the live-operation thresholds.
    pub fn live(class_names: Vec<String>) -> Self {
        Self::new(class_names, LIVE_CONF_THRESH, LIVE_NMS_THRESH)
    }

    /// Selector with the replay thresholds.
    pub fn replay(class_names: Vec<String>) -> Self {
        Self::new(class_names, REPLAY_CONF_THRESH, REPLAY_NMS_THRESH)
    }

    /// Reduce a candidate set to at most one detection.
    ///
    /// Deterministic for a given input sequence: every tie, both during
    /// suppression and at final selection, resolves to the candidate seen
    /// first in the input.
    pub fn select(&self, candidates: &[RawCandidate]) -> Option<Detection> {
        let survivors = self.filter_and_suppress(candidates);

        let mut winner = *survivors.first()?;
        for &index in &survivors[1..] {
            if candidates[index].confidence > candidates[winner].confidence {
                winner = index;
            }
        }

        let best = &candidates[winner];
        Some(Detection {
            label: self.class_names[best.class_id].clone(),
            x: (best.cx - best.w / 2.0) as i32,
            y: (best.cy - best.h / 2.0) as i32,
            w: best.w as i32,
            h: best.h as i32,
            score: best.confidence,
        })
    }

    /// Confidence filter plus greedy non-max suppression.
    ///
    /// Returns the indices of surviving candidates. A candidate survives
    /// the filter only with confidence strictly above the floor, and is
    /// suppressed only when its overlap with a kept candidate is strictly
    /// above the suppression threshold; exact-threshold overlap keeps both.
    fn filter_and_suppress(&self, candidates: &[RawCandidate]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len())
            .filter(|&index| candidates[index].confidence > self.conf_thresh)
            .collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .confidence
                .partial_cmp(&candidates[a].confidence)
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut suppressed = vec![false; candidates.len()];
        let mut survivors = Vec::new();
        for (position, &kept) in order.iter().enumerate() {
            if suppressed[kept] {
                continue;
            }
            survivors.push(kept);
            for &other in &order[position + 1..] {
                if !suppressed[other] && iou(&candidates[kept], &candidates[other]) > self.nms_thresh
                {
                    suppressed[other] = true;
                }
            }
        }
        survivors
    }
}

/// Intersection-over-union of two center-point boxes.
fn iou(a: &RawCandidate, b: &RawCandidate) -> f32 {
    let x1 = (a.cx - a.w / 2.0).max(b.cx - b.w / 2.0);
    let y1 = (a.cy - a.h / 2.0).max(b.cy - b.h / 2.0);
    let x2 = (a.cx + a.w / 2.0).min(b.cx + b.w / 2.0);
    let y2 = (a.cy + a.h / 2.0).min(b.cy + b.h / 2.0);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.w * a.h + b.w * b.h - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
