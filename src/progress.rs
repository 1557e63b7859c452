//! Progress reporting for batch runs.
//!
//! The batch runner only emits [`ProgressEvent`]s. Rendering is up to the sink.

use crate::constants::{PROGRESS_BAR_CHARS, PROGRESS_BAR_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// An item is about to be compressed.
    Started {
        index: usize,
        total: usize,
        name: String,
    },
    /// An item finished successfully.
    Completed {
        name: String,
        processed: usize,
        total: usize,
        percent: u8,
    },
    /// An item failed and was skipped.
    Skipped {
        name: String,
        reason: String,
        processed: usize,
        total: usize,
        percent: u8,
    },
    /// The run ended.
    Finished { succeeded: usize, failed: usize },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that ignores every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Terminal progress bar showing processed/total and a percentage.
///
/// The percentage is the one carried by each event, not indicatif's own
/// `{percent}`, which truncates.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(PROGRESS_BAR_CHARS);
        bar.set_style(style);
        bar.set_prefix("0");
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn advance(&self, processed: usize, percent: u8) {
        self.bar.set_prefix(percent.to_string());
        self.bar.set_position(processed as u64);
    }
}

impl ProgressSink for BarProgress {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { name, .. } => self.bar.set_message(name),
            ProgressEvent::Completed {
                processed, percent, ..
            } => self.advance(processed, percent),
            ProgressEvent::Skipped {
                name,
                reason,
                processed,
                percent,
                ..
            } => {
                self.bar.suspend(|| eprintln!("❌ Failed to process {}: {}", name, reason));
                self.advance(processed, percent);
            }
            ProgressEvent::Finished { failed, .. } => {
                if failed == 0 {
                    self.bar.finish_with_message("✅ Batch compression complete");
                } else {
                    self.bar
                        .finish_with_message(format!("⚠️  Batch complete with {} failures", failed));
                }
            }
        }
    }
}
