//! Stage spinners using indicatif
//!
//! Spinners sit under a step header and finish with the same check mark
//! and colours as `print_success`, so a finished stage reads like the
//! lines printed around it.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "    {spinner:.cyan} {msg} {elapsed:.dim}";
const FINISHED_TEMPLATE: &str = "    {msg}";

/// Create a spinner for a stage whose duration is unknown
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
        pb.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✓"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn finish(pb: &ProgressBar, message: String) {
    if let Ok(done) = ProgressStyle::with_template(FINISHED_TEMPLATE) {
        pb.set_style(done);
    }
    pb.finish_with_message(message);
}

/// Finish a stage spinner as successful
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    finish(
        pb,
        format!("{} {}", style("✓").green().bold(), style(message).green()),
    );
}

/// Finish a stage spinner that produced nothing to act on
pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    finish(
        pb,
        format!("{} {}", style("!").yellow().bold(), style(message).yellow()),
    );
}
