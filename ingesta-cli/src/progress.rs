// ============================================================================
// ingesta-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal Progress Bar
//
// Draws the per-file progress of an ingest run with indicatif. The core
// pipeline drives it through the `ProgressTracker` trait.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ingesta_core::ProgressTracker;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files ({eta})";

/// Progress bar shown on stderr while files are ingested.
#[derive(Clone)]
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a bar, or a hidden one when `visible` is false or stderr is
    /// not a terminal.
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if !visible || !console::Term::stderr().is_term() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    /// Files completed so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressTracker for CliProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn tick(&self, done: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(done as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let progress = CliProgress::new(false);
        progress.start(3);
        progress.tick(1, 3);
        progress.tick(2, 3);
        assert_eq!(progress.position(), 2);
        progress.tick(4, 4);
        assert_eq!(progress.position(), 4);
        progress.finish();
    }
}
