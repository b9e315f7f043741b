//! Terminal progress display for sweeps.

use clap::ValueEnum;
use fleetscope_core::progress::{DONE_GLYPH, SPINNER_GLYPHS};
use fleetscope_core::{LogProgress, NoopProgress, ProgressReporter, ProgressUpdate, TaskProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner frames; indicatif shows the last one once the bar finishes
const TICK_STRINGS: [&str; 5] = [
    SPINNER_GLYPHS[0],
    SPINNER_GLYPHS[1],
    SPINNER_GLYPHS[2],
    SPINNER_GLYPHS[3],
    DONE_GLYPH,
];

const BAR_TEMPLATE: &str =
    "{spinner} Task Progress: {percent:>3}% ({pos}/{len}) {bar:30.cyan/blue} {msg}";

/// How sweep progress is shown
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// Animated progress bar
    #[default]
    Bar,
    /// Plain single-line text indicator
    Text,
    /// Progress as log lines
    Log,
    /// No progress output
    None,
}

/// Progress bar over an indicatif [`ProgressBar`]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Creates a bar for `total` steps
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(&TICK_STRINGS)
            .progress_chars("■■□");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// A bar that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Current position of the bar
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressReporter for BarProgress {
    fn report(&mut self, update: &ProgressUpdate) {
        self.bar.set_length(update.total as u64);
        self.bar.set_position(update.current.min(update.total) as u64);
        self.bar.set_message(update.label.clone());
    }

    fn finish(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(total as u64);
        self.bar.finish_with_message(format!("{} devices", total));
    }
}

/// Builds the reporter for `mode`
pub fn reporter(mode: ProgressMode, total: usize) -> Box<dyn ProgressReporter> {
    match mode {
        ProgressMode::Bar => Box::new(BarProgress::new(total)),
        ProgressMode::Text => Box::new(TaskProgress::stderr()),
        ProgressMode::Log => Box::new(LogProgress::new("sweep")),
        ProgressMode::None => Box::new(NoopProgress),
    }
}
