//! The continuous detection loop.
//!
//! One dedicated worker thread drives the pipeline: grab a frame, run the
//! detector, select the best candidate, publish. The loop is strictly
//! sequential; no two cycles ever run concurrently. Stop requests arrive as
//! a flag checked once per cycle, so in-flight inference is never
//! interrupted, only the next cycle is suppressed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::detect::Detector;
use crate::ingest::{FrameSource, Grab};
use crate::select::Selector;
use crate::status::Publisher;

/// Cooperative yield between cycles. Not a rate limiter; throughput is
/// otherwise bounded only by inference latency.
const CYCLE_YIELD: Duration = Duration::from_millis(1);

/// Lifecycle state of the loop. Stopped is terminal; a monitor never
/// restarts itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Handle to the running detection loop.
///
/// The detector and frame source move into the worker thread and are
/// dropped when it exits, which releases the model and feed resources on
/// any shutdown path.
pub struct Monitor {
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Start the loop on its own worker thread.
    pub fn spawn<D, S, P>(detector: D, source: S, selector: Selector, publisher: P) -> Self
    where
        D: Detector + 'static,
        S: FrameSource + 'static,
        P: Publisher + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        let worker = {
            let stop = stop.clone();
            let running = running.clone();
            std::thread::spawn(move || {
                run_loop(detector, source, selector, publisher, stop);
                running.store(false, Ordering::SeqCst);
            })
        };
        Self {
            stop,
            running,
            worker: Some(worker),
        }
    }

    pub fn state(&self) -> LoopState {
        if self.running.load(Ordering::SeqCst) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    /// Request stop and wait for the worker to finish its current cycle.
    ///
    /// Safe to call from any thread, any number of times, including on a
    /// loop that already stopped on its own.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("monitor worker panicked");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<D, S, P>(
    mut detector: D,
    mut source: S,
    selector: Selector,
    publisher: P,
    stop: Arc<AtomicBool>,
) where
    D: Detector,
    S: FrameSource,
    P: Publisher,
{
    log::info!("monitor loop running");
    while !stop.load(Ordering::SeqCst) {
        match source.grab() {
            Grab::Exhausted => {
                log::info!("frame source exhausted, stopping monitor loop");
                break;
            }
            Grab::Absent => publisher.publish(None),
            Grab::Frame(frame) => match detector.infer(&frame) {
                Ok(candidates) => {
                    let detection = selector.select(&candidates);
                    if let Some(detection) = &detection {
                        log::debug!(
                            "{} found at: {} {} [{} {}], prob={}",
                            detection.label,
                            detection.x,
                            detection.y,
                            detection.w,
                            detection.h,
                            detection.score
                        );
                    }
                    publisher.publish(detection.as_ref());
                }
                Err(err) => {
                    log::warn!("inference failed: {}", err);
                    publisher.publish(None);
                }
            },
        }
        std::thread::sleep(CYCLE_YIELD);
    }
    log::info!("monitor loop stopped");
}
