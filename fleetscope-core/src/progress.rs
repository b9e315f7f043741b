//! Progress reporting for sweeps and view building.
//!
//! Reporting is purely observational: reporters receive updates from a
//! single consumer and nothing they do feeds back into collection.

use std::io::Write;

/// Rotating glyphs shown while a task is running
pub const SPINNER_GLYPHS: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Glyph shown once a task completes
pub const DONE_GLYPH: &str = "✓";

/// One step of progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// One-based index of the item just processed
    pub current: usize,
    pub total: usize,
    /// Item the step was about, usually a hostname
    pub label: String,
}

impl ProgressUpdate {
    pub fn new(current: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    /// Completion percentage, with `current` capped at `total`.
    ///
    /// An empty task counts as complete.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current.min(self.total) as f64 / self.total as f64) * 100.0
    }
}

/// Receives progress updates.
pub trait ProgressReporter: Send {
    /// Called after each item is processed
    fn report(&mut self, update: &ProgressUpdate);

    /// Called once after the last item
    fn finish(&mut self, total: usize);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&mut self, _update: &ProgressUpdate) {}

    fn finish(&mut self, _total: usize) {}
}

/// Reports progress through `tracing` at info level.
#[derive(Debug, Clone)]
pub struct LogProgress {
    task: String,
}

impl LogProgress {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}

impl ProgressReporter for LogProgress {
    fn report(&mut self, update: &ProgressUpdate) {
        tracing::info!(
            "{}: {}/{} ({:.2}%) {}",
            self.task,
            update.current.min(update.total),
            update.total,
            update.percentage(),
            update.label
        );
    }

    fn finish(&mut self, total: usize) {
        tracing::info!("{}: finished {} items", self.task, total);
    }
}

/// Single-line text indicator with a rotating glyph.
///
/// Each update rewrites the current line (`\r`), the completion line ends
/// with a newline.
pub struct TaskProgress<W: Write + Send = std::io::Stderr> {
    out: W,
    glyph: usize,
}

impl TaskProgress<std::io::Stderr> {
    /// Indicator writing to standard error
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TaskProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, glyph: 0 }
    }

    /// Renders an update and advances the glyph
    pub fn render(&mut self, update: &ProgressUpdate) -> String {
        let glyph = SPINNER_GLYPHS[self.glyph];
        self.glyph = (self.glyph + 1) % SPINNER_GLYPHS.len();
        let mut line = format!(
            "{} Task Progress: {:.2}% ({}/{})",
            glyph,
            update.percentage(),
            update.current.min(update.total),
            update.total
        );
        if !update.label.is_empty() {
            line.push(' ');
            line.push_str(&update.label);
        }
        line
    }

    /// Renders the completion line
    pub fn render_complete(total: usize) -> String {
        format!(
            "{} Task Progress: {:.2}% ({}/{})",
            DONE_GLYPH, 100.0, total, total
        )
    }

    /// Consumes the indicator, returning its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressReporter for TaskProgress<W> {
    fn report(&mut self, update: &ProgressUpdate) {
        let line = self.render(update);
        // Progress output is best effort.
        let _ = write!(self.out, "\r\t{}", line);
        let _ = self.out.flush();
    }

    fn finish(&mut self, total: usize) {
        let _ = writeln!(self.out, "\r\t{}", Self::render_complete(total));
        let _ = self.out.flush();
    }
}
