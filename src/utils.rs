//! Utility functions for common operations
//!
//! Size formatting and the percentage math shared by the single-file
//! compressor, the batch summary and the estimator.

use crate::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Same as [`format_file_size`] for signed deltas such as saved bytes.
pub fn format_signed_size(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_file_size(bytes.unsigned_abs()))
    } else {
        format_file_size(bytes as u64)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `original - compressed`, negative when the output grew.
pub fn saved_bytes(original_size: u64, compressed_size: u64) -> i64 {
    original_size as i64 - compressed_size as i64
}

/// Saved share of `original_size` in percent, two decimals.
/// Zero when there is nothing to compare against.
pub fn saved_percent(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    round2(saved_bytes(original_size, compressed_size) as f64 / original_size as f64 * 100.0)
}

/// `current / total` in percent, two decimals.
pub fn percent_complete(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    round2(current as f64 / total as f64 * 100.0)
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Create a bounded progress bar for `total` files
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
