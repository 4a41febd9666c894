//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use quartex_install::OperationReport;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Summarise what an operation did to the project
pub fn report_summary(report: &OperationReport) {
    if report.is_cancelled() {
        info("Cancelled; no files were changed");
        return;
    }
    if !report.created.is_empty() {
        success(&format!("Created {} file(s)", report.created.len()));
    }
    if !report.overwritten.is_empty() {
        success(&format!("Overwrote {} file(s)", report.overwritten.len()));
    }
    if !report.skipped.is_empty() {
        info(&format!("Skipped {} existing file(s)", report.skipped.len()));
    }
    if !report.cleaned.is_empty() {
        info(&format!("Cleaned {} stale file(s)", report.cleaned.len()));
    }
    if report.written_count() == 0 && report.cleaned.is_empty() {
        info("Nothing to do");
    }
}
