use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};

use aicenter::{
    Detection, Grab, LoopState, Monitor, Publisher, RawCandidate, ReplayConfig, ReplaySource,
    Selector, Status, StatusBoard, StubDetector, StubSource,
};

fn frame() -> RgbImage {
    RgbImage::new(8, 8)
}

fn names() -> Vec<String> {
    vec!["loop".to_string()]
}

fn candidate(confidence: f32) -> RawCandidate {
    RawCandidate {
        class_id: 0,
        confidence,
        cx: 100.0,
        cy: 50.0,
        w: 20.0,
        h: 10.0,
    }
}

fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Publisher wrapper that counts publications on top of the shared board.
#[derive(Clone, Default)]
struct CountingBoard {
    board: StatusBoard,
    published: Arc<AtomicUsize>,
}

impl CountingBoard {
    fn count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

impl Publisher for CountingBoard {
    fn publish(&self, detection: Option<&Detection>) {
        self.board.publish(detection);
        self.published.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn frame_loss_keeps_the_loop_running() {
    let source = StubSource::new((0..1000).map(|_| Grab::Absent));
    let publisher = CountingBoard::default();
    let board = publisher.board.clone();
    let counter = publisher.clone();

    let mut monitor = Monitor::spawn(StubDetector::new(), source, Selector::live(names()), publisher);

    assert!(wait_for(|| counter.count() >= 5, Duration::from_secs(5)));
    assert_eq!(monitor.state(), LoopState::Running);

    let snapshot = board.snapshot();
    assert_eq!(snapshot.status, Status::Invalid);
    assert_eq!(snapshot.score, 0.0);

    monitor.stop();
    assert_eq!(monitor.state(), LoopState::Stopped);
}

#[test]
fn best_detection_is_published_end_to_end() {
    let source = StubSource::new([Grab::Frame(frame())]);
    let detector = StubDetector::with_script([vec![candidate(0.6), candidate(0.9)]]);
    let publisher = CountingBoard::default();
    let board = publisher.board.clone();

    let mut monitor = Monitor::spawn(detector, source, Selector::live(names()), publisher);

    assert!(wait_for(
        || board.snapshot().status == Status::Valid,
        Duration::from_secs(5)
    ));
    let snapshot = board.snapshot();
    assert_eq!((snapshot.x, snapshot.y, snapshot.w, snapshot.h), (90, 45, 20, 10));
    assert_eq!(snapshot.label, "loop");
    assert_eq!(snapshot.score, 0.9);

    monitor.stop();
}

#[test]
fn below_threshold_candidates_publish_invalid() {
    let source = StubSource::new([Grab::Frame(frame())]);
    let detector = StubDetector::with_script([vec![candidate(0.4)]]);
    let publisher = CountingBoard::default();
    let board = publisher.board.clone();
    let counter = publisher.clone();

    let mut monitor = Monitor::spawn(detector, source, Selector::live(names()), publisher);

    assert!(wait_for(|| counter.count() >= 1, Duration::from_secs(5)));
    let snapshot = board.snapshot();
    assert_eq!(snapshot.status, Status::Invalid);
    assert_eq!(snapshot.score, 0.0);

    monitor.stop();
}

#[test]
fn replay_exhaustion_stops_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))
            .save(dir.path().join(name))
            .unwrap();
    }
    let source = ReplaySource::new(ReplayConfig {
        images: dir.path().to_path_buf(),
        interval: Duration::ZERO,
    })
    .unwrap();
    let publisher = CountingBoard::default();
    let counter = publisher.clone();

    let mut monitor = Monitor::spawn(StubDetector::new(), source, Selector::replay(names()), publisher);

    assert!(wait_for(
        || monitor.state() == LoopState::Stopped,
        Duration::from_secs(5)
    ));
    // One publication per replayed image, none after exhaustion.
    assert_eq!(counter.count(), 3);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(counter.count(), 3);

    monitor.stop();
    assert_eq!(monitor.state(), LoopState::Stopped);
}

#[test]
fn stop_is_idempotent() {
    let source = StubSource::new((0..100_000).map(|_| Grab::Absent));
    let mut monitor = Monitor::spawn(
        StubDetector::new(),
        source,
        Selector::live(names()),
        StatusBoard::new(),
    );

    monitor.stop();
    assert_eq!(monitor.state(), LoopState::Stopped);
    monitor.stop();
    assert_eq!(monitor.state(), LoopState::Stopped);
}

#[test]
fn stop_can_be_issued_from_another_thread() {
    let source = StubSource::new((0..100_000).map(|_| Grab::Absent));
    let mut monitor = Monitor::spawn(
        StubDetector::new(),
        source,
        Selector::live(names()),
        StatusBoard::new(),
    );

    let handle = std::thread::spawn(move || {
        monitor.stop();
        monitor.state()
    });
    assert_eq!(handle.join().unwrap(), LoopState::Stopped);
}

#[test]
fn stopping_an_already_exhausted_loop_is_a_no_op() {
    let source = StubSource::new([]);
    let mut monitor = Monitor::spawn(
        StubDetector::new(),
        source,
        Selector::live(names()),
        StatusBoard::new(),
    );

    assert!(wait_for(
        || monitor.state() == LoopState::Stopped,
        Duration::from_secs(5)
    ));
    monitor.stop();
    assert_eq!(monitor.state(), LoopState::Stopped);
}
