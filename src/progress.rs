//! Progress indicators for groupctl.

use colored::Colorize;
use declarative::{ApplyResult, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for `len` steps
pub fn bar(len: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb
}

/// Create a spinner with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Symbol for an apply result
pub fn result_symbol(result: &ApplyResult) -> colored::ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created
        | ApplyResult::Modified
        | ApplyResult::Replaced
        | ApplyResult::Removed => "✓".green(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

/// [`ProgressCallback`] driving an indicatif bar
///
/// Hidden when `quiet` is set.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        self.bar = Some(bar(count as u64, "Applying"));
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if let Some(pb) = &self.bar
            && *result != ApplyResult::NoChange
        {
            pb.set_message(format!("{} {}", result_symbol(result), id));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}
