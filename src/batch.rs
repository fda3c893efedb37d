use crate::config::CompressionSettings;
use crate::error::Result;
use crate::processing::{compress_file, CompressionOutcome};
use crate::scanner::scan;
use crate::utils::{percent_complete, saved_bytes, saved_percent};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Emitted after every file of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// 1-based
    pub current_index: usize,
    pub total: usize,
    /// Two-decimal percentage, reaches exactly 100 on the last file
    pub percent_complete: f64,
    pub current_file_name: String,
    pub succeeded: bool,
    /// Saved bytes over all successful files so far
    pub cumulative_saved_bytes: i64,
}

/// Running totals of a batch run. Only successful files count towards sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatistics {
    pub total_files: usize,
    pub processed_count: usize,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub original_size_bytes: u64,
    pub compressed_size_bytes: u64,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BatchStatistics {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Default::default()
        }
    }

    /// Folds one file's outcome into the totals.
    pub fn record(&mut self, outcome: &CompressionOutcome) {
        self.processed_count += 1;
        match outcome {
            CompressionOutcome::Succeeded(stats) => {
                self.succeeded_count += 1;
                self.original_size_bytes += stats.original_size;
                self.compressed_size_bytes += stats.compressed_size;
            }
            CompressionOutcome::Failed { .. } => self.failed_count += 1,
        }
    }

    pub fn saved_bytes(&self) -> i64 {
        saved_bytes(self.original_size_bytes, self.compressed_size_bytes)
    }

    /// Zero when nothing was compressed successfully.
    pub fn saved_percent(&self) -> f64 {
        saved_percent(self.original_size_bytes, self.compressed_size_bytes)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total_files,
            succeeded: self.succeeded_count,
            failed: self.failed_count,
            original_size_bytes: self.original_size_bytes,
            compressed_size_bytes: self.compressed_size_bytes,
            saved_bytes: self.saved_bytes(),
            saved_percent: self.saved_percent(),
        }
    }
}

/// Final report of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub original_size_bytes: u64,
    pub compressed_size_bytes: u64,
    pub saved_bytes: i64,
    pub saved_percent: f64,
}

/// Compresses every supported image under `input_root` into the same relative
/// location under `output_root`.
///
/// Files are processed one at a time. `on_progress` is called synchronously
/// after each file. Only a failed scan aborts the run; per-file failures are
/// counted and the run moves on.
///
/// # Arguments
/// * `input_root` - Directory tree to compress
/// * `output_root` - Root of the mirrored output tree, created as needed
/// * `settings` - Validated compression settings
/// * `on_progress` - Optional callback receiving one [`ProgressEvent`] per file
///
/// # Returns
/// * `Ok(BatchStatistics)` - Totals over the run, including its elapsed time
/// * `Err(CompressionError)` - The input tree could not be scanned
pub fn compress_all(
    input_root: &Path,
    output_root: &Path,
    settings: &CompressionSettings,
    mut on_progress: Option<&mut dyn FnMut(&ProgressEvent)>,
) -> Result<BatchStatistics> {
    let start_time = Instant::now();

    let files = scan(input_root)?;
    let total = files.len();
    info!(
        "Compressing {} image files from {:?} into {:?}",
        total, input_root, output_root
    );

    let mut statistics = BatchStatistics::new(total);

    for (index, file) in files.iter().enumerate() {
        let output_path = output_root.join(&file.relative_path);
        let outcome = compress_file(file, &output_path, settings);
        statistics.record(&outcome);

        debug!(
            "[{}/{}] {} {}",
            index + 1,
            total,
            file.file_name,
            if outcome.is_success() { "ok" } else { "failed" }
        );

        if let Some(callback) = on_progress.as_deref_mut() {
            callback(&ProgressEvent {
                current_index: index + 1,
                total,
                percent_complete: percent_complete(index + 1, total),
                current_file_name: file.file_name.clone(),
                succeeded: outcome.is_success(),
                cumulative_saved_bytes: statistics.saved_bytes(),
            });
        }
    }

    statistics.elapsed = start_time.elapsed();
    info!(
        "Batch complete: {} succeeded, {} failed",
        statistics.succeeded_count, statistics.failed_count
    );
    Ok(statistics)
}
