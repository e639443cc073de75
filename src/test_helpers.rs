//! Shared test utilities for the ringview test suite.
//!
//! Provides ring builders and extractors, a recording [`Presenter`], a manual
//! [`Scheduler`], and session constructors wired to the
//! [`MockBackend`](crate::imaging::backend::tests::MockBackend).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut session = session_with(&[("a.jpg", 400, 200)], ViewSettings::default());
//! session.next_image().unwrap();
//! assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
//! assert_eq!(active_current(&session), Dimensions::new(400, 200));
//! ```

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use crate::collection::{ImageRecord, ImageRing, RecordId};
use crate::imaging::backend::tests::MockBackend;
use crate::imaging::{Dimensions, PixelBuffer, Rotation};
use crate::session::{Presenter, Session, ViewSettings};
use crate::slideshow::{Scheduler, Slideshow};

/// Monitor size every test session starts with.
pub const TEST_MONITOR: Dimensions = Dimensions::new(1024, 768);

// =========================================================================
// Ring helpers
// =========================================================================

/// Ring over the given paths, nothing active.
pub fn ring_of(paths: &[&str]) -> ImageRing {
    ImageRing::from_paths(paths.iter().copied())
}

fn name(ring: &ImageRing, id: RecordId) -> String {
    ring.get(id)
        .unwrap_or_else(|| panic!("{id:?} is not in the ring"))
        .file_name()
}

/// File names for a list of ids. Panics on a dead id.
pub fn names(ring: &ImageRing, ids: &[RecordId]) -> Vec<String> {
    ids.iter().map(|&id| name(ring, id)).collect()
}

/// File names in forward order from the head.
pub fn forward_names(ring: &ImageRing) -> Vec<String> {
    ring.iter().map(|(_, record)| record.file_name()).collect()
}

/// File names following `prev` links, starting at the head.
pub fn backward_names(ring: &ImageRing) -> Vec<String> {
    let Some(head) = ring.head() else {
        return Vec::new();
    };
    let mut ids = vec![head];
    let mut cursor = head;
    for _ in 1..ring.len() {
        cursor = ring.prev_of(cursor).unwrap();
        ids.push(cursor);
    }
    names(ring, &ids)
}

pub fn active_name(ring: &ImageRing) -> Option<String> {
    ring.active_record().map(ImageRecord::file_name)
}

// =========================================================================
// Collaborator doubles
// =========================================================================

/// What the presenter was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownFrame {
    pub file: String,
    pub dims: Dimensions,
    pub rotation: Rotation,
}

/// Presenter that remembers everything and answers prompts from a queue
/// (no answer queued means "no").
#[derive(Debug)]
pub struct RecordingPresenter {
    pub monitor: Dimensions,
    pub window: Dimensions,
    pub shown: Vec<ShownFrame>,
    pub prompts: Vec<String>,
    pub answers: VecDeque<bool>,
    pub warnings: Vec<String>,
    pub info_shown: Vec<String>,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self {
            monitor: TEST_MONITOR,
            window: TEST_MONITOR,
            shown: Vec::new(),
            prompts: Vec::new(),
            answers: VecDeque::new(),
            warnings: Vec::new(),
            info_shown: Vec::new(),
        }
    }
}

impl Presenter for RecordingPresenter {
    fn monitor_size(&self) -> Dimensions {
        self.monitor
    }

    fn window_size(&self) -> Dimensions {
        self.window
    }

    fn on_buffer_ready(&mut self, buffer: &PixelBuffer, record: &ImageRecord, _view: &ViewSettings) {
        self.shown.push(ShownFrame {
            file: record.file_name(),
            dims: buffer.dimensions(),
            rotation: record.geometry.rotation,
        });
    }

    fn prompt_user(&mut self, message: &str, _affirmative: &str, _negative: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn show_info(
        &mut self,
        record: &ImageRecord,
        position: usize,
        total: usize,
        _view: &ViewSettings,
    ) {
        self.info_shown
            .push(format!("{} ({position} of {total})", record.file_name()));
    }
}

/// Scheduler the test fires by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub pending: bool,
    pub scheduled: Vec<Duration>,
    pub cancelled: usize,
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.pending = true;
        self.scheduled.push(delay);
    }

    fn cancel(&mut self) {
        self.pending = false;
        self.cancelled += 1;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }
}

// =========================================================================
// Sessions
// =========================================================================

pub type TestSession = Session<MockBackend, RecordingPresenter, ManualScheduler>;

/// Session over `paths`, decoded by `backend`, slideshow off.
pub fn session_from(backend: MockBackend, paths: &[&str], view: ViewSettings) -> TestSession {
    Session::new(
        ring_of(paths),
        view,
        backend,
        RecordingPresenter::default(),
        Slideshow::new(ManualScheduler::default(), Duration::ZERO),
    )
}

/// Session over in-memory images of the given sizes.
pub fn session_with(images: &[(&str, u32, u32)], view: ViewSettings) -> TestSession {
    let backend = images
        .iter()
        .fold(MockBackend::new(), |backend, &(path, w, h)| {
            backend.with_image(path, w, h)
        });
    let paths: Vec<&str> = images.iter().map(|&(path, _, _)| path).collect();
    session_from(backend, &paths, view)
}

pub fn active_file(session: &TestSession) -> Option<String> {
    active_name(session.ring())
}

/// Displayed size recorded for the active image. Also checks that the
/// buffer on screen agrees with it.
pub fn active_current(session: &TestSession) -> Dimensions {
    let current = session
        .active_record()
        .expect("no active image")
        .geometry
        .current;
    if let Some(buffer) = session.buffer() {
        assert_eq!(buffer.dimensions(), current, "buffer and geometry disagree");
    }
    current
}

/// Real (empty) files in a temp directory, for tests that delete from disk.
/// Pixel data still comes from the mock backend, keyed by full path.
pub struct DiskFixture {
    dir: TempDir,
    images: Vec<(String, u32, u32)>,
    broken: Vec<String>,
}

impl DiskFixture {
    pub fn new(images: &[(&str, u32, u32)]) -> Self {
        let dir = TempDir::new().unwrap();
        for &(file, _, _) in images {
            std::fs::write(dir.path().join(file), b"").unwrap();
        }
        Self {
            dir,
            images: images
                .iter()
                .map(|&(file, w, h)| (file.to_string(), w, h))
                .collect(),
            broken: Vec::new(),
        }
    }

    pub fn broken(mut self, file: &str) -> Self {
        self.broken.push(file.to_string());
        self
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    fn key(&self, file: &str) -> String {
        self.path(file).to_string_lossy().to_string()
    }

    pub fn session(&self, view: ViewSettings) -> TestSession {
        let mut backend = MockBackend::new();
        for (file, w, h) in &self.images {
            backend = backend.with_image(&self.key(file), *w, *h);
        }
        for file in &self.broken {
            backend = backend.with_broken(&self.key(file));
        }
        let keys: Vec<String> = self.images.iter().map(|(file, _, _)| self.key(file)).collect();
        let paths: Vec<&str> = keys.iter().map(String::as_str).collect();
        session_from(backend, &paths, view)
    }
}
