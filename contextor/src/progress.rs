//! Lightweight progress reporting for the answer pipeline.
//!
//! Use `NoopProgress` for servers (default) and `IndicatifProgress` for
//! interactive terminals.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface used inside [`crate::Contextor::answer_with_progress`].
pub trait Progress: Send + Sync {
    /// Replace current message.
    fn message(&self, _msg: &str) {}
    /// Remove the indicator.
    fn finish(&self) {}
}

/// No-op reporter for servers/headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Indicatif spinner, drawn on stderr.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("-\\|/ ");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
