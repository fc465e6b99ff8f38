// ============================================================================
// ingesta-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Per-File Progress Ticks
//
// The pipeline reports progress through this trait instead of drawing
// anything itself. The CLI plugs in a progress bar; tests plug in a recorder.
//
// KEY COMPONENTS:
// - ProgressTracker: Trait receiving start / tick / finish notifications
// - NullProgress: No-op implementation
// - RecordingProgress: Keeps every tick for inspection

use std::sync::Mutex;

/// Receives progress notifications for one ingestion run.
///
/// `tick` is called exactly once per discovered file, after all work for
/// that file is complete, whatever its outcome. Calls are serialized by the
/// pipeline and `done` strictly increases from 1 to the number of files
/// processed.
pub trait ProgressTracker: Send + Sync {
    /// Called once, before the first file, with the pre-walk file count.
    fn start(&self, total: usize);

    /// Called after each file with the running count of finished files.
    fn tick(&self, done: usize, total: usize);

    /// Called once after the last file.
    fn finish(&self);
}

/// No-op implementation of ProgressTracker that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressTracker for NullProgress {
    fn start(&self, _total: usize) {}

    fn tick(&self, _done: usize, _total: usize) {}

    fn finish(&self) {}
}

/// Records every notification, in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    started: Mutex<Option<usize>>,
    ticks: Mutex<Vec<(usize, usize)>>,
    finished: Mutex<bool>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total passed to `start`, if it was called.
    pub fn started_with(&self) -> Option<usize> {
        self.started.lock().map(|s| *s).unwrap_or(None)
    }

    /// Every `(done, total)` pair received.
    pub fn ticks(&self) -> Vec<(usize, usize)> {
        self.ticks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.lock().map(|f| *f).unwrap_or(false)
    }
}

impl ProgressTracker for RecordingProgress {
    fn start(&self, total: usize) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(total);
        }
    }

    fn tick(&self, done: usize, total: usize) {
        if let Ok(mut ticks) = self.ticks.lock() {
            ticks.push((done, total));
        }
    }

    fn finish(&self) {
        if let Ok(mut finished) = self.finished.lock() {
            *finished = true;
        }
    }
}
