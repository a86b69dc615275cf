//! Progress indicators for CLI operations
//!
//! Spinners draw on stderr and hide themselves when stderr is not a
//! terminal, so piped report output stays clean.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a hidden spinner (used with `--format json`)
pub fn hidden() -> ProgressBar {
    ProgressBar::hidden()
}
