//! Terminal output for the dir-sizer binary
//!
//! A status spinner while the run is in flight and a summary once it
//! finishes. Totals are only shown after the run completes.

use crate::config::SaturationPolicy;
use crate::sizer::DirSize;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner showing the run status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Template is a constant; fall back to the default style if it is rejected
        let spinner = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(spinner);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Size as shown in the summary
pub fn format_bytes(bytes: u64, exact: bool) -> String {
    if exact {
        format!("{} bytes", format_number(bytes))
    } else {
        format_size(bytes, BINARY)
    }
}

/// Print a header at the start of the run
pub fn print_header(root: &str, workers: usize, policy: SaturationPolicy) {
    println!();
    println!(
        "{} {}",
        style("dir-sizer").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {:?}", style("Policy:").bold(), policy);
    println!();
}

/// Print the totals of a completed run
pub fn print_summary(total: DirSize, duration: Duration, exact_bytes: bool) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        total.file_count as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Size Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(total.file_count)
    );
    println!(
        "  {} {}",
        style("Total Size:").bold(),
        format_bytes(total.total_size, exact_bytes)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    println!();
}

/// Print only the totals, for quiet mode
pub fn print_plain(total: DirSize, exact_bytes: bool) {
    println!(
        "{}\t{}",
        format_bytes(total.total_size, exact_bytes),
        total.file_count
    );
}
