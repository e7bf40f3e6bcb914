//! Progress reporting: count-style bars for the map phase (sources) and the reduce phase (keys).

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Count-style progress bar (items processed out of total), with an optional label.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// A progress bar that may be switched off. All methods are no-ops when disabled.
pub struct ProgressScope {
    pb: Option<ProgressBar>,
}

impl ProgressScope {
    pub fn count(enabled: bool, label: &str, total: u64) -> Self {
        Self { pb: enabled.then(|| make_count_progress(total, label)) }
    }

    #[inline]
    pub fn inc(&self, delta: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }
    }

    /// Jump to `pos`; sources that yield no records are only counted this way.
    pub fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.pb {
            pb.set_position(pos);
        }
    }

    pub fn finish(&self, msg: impl Into<String>) {
        if let Some(pb) = &self.pb {
            pb.finish_with_message(msg.into());
        }
    }

    /// Leave the bar where it stopped (used when a phase aborts).
    pub fn abandon(&self) {
        if let Some(pb) = &self.pb {
            pb.abandon();
        }
    }
}
