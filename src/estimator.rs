//! Whole-tree savings estimate from a random sample.
//!
//! A handful of files are pushed through the same [`compress_file`] the batch
//! run uses, into a scratch directory that is removed afterwards. Their
//! combined compressed/original ratio is then applied to the full tree.

use crate::config::CompressionSettings;
use crate::constants::{
    ESTIMATE_MAX_SAMPLES, ESTIMATE_MIN_SAMPLES, ESTIMATE_SAMPLE_FRACTION, ESTIMATE_SCRATCH_PREFIX,
};
use crate::error::{CompressionError, Result};
use crate::metadata::{analyze, MetadataSampleReport};
use crate::processing::{compress_file, resolve_output_path, CompressionOutcome};
use crate::scanner::{scan, total_size, FileRecord};
use crate::utils::{saved_bytes, saved_percent};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Measured result for one sampled file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleResult {
    pub name: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub saved_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub file_count: usize,
    pub original_size_bytes: u64,
    pub estimated_compressed_size_bytes: u64,
    pub estimated_saved_bytes: i64,
    pub estimated_saved_percent: f64,
    pub sample_count: usize,
    /// Successful samples only
    pub sample_results: Vec<SampleResult>,
    pub average_original_size: u64,
    pub average_estimated_size: u64,
    pub metadata_report: MetadataSampleReport,
}

/// `clamp(ceil(total * 10%), 1, 10)`
pub fn sample_size(total_files: usize) -> usize {
    let tenth = (total_files as f64 * ESTIMATE_SAMPLE_FRACTION).ceil() as usize;
    tenth.clamp(ESTIMATE_MIN_SAMPLES, ESTIMATE_MAX_SAMPLES)
}

/// Uniform sample of `count` distinct files: shuffle, then take.
pub fn sample_files<'a, R: Rng + ?Sized>(
    files: &'a [FileRecord],
    count: usize,
    rng: &mut R,
) -> Vec<&'a FileRecord> {
    let mut shuffled: Vec<&FileRecord> = files.iter().collect();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Estimates the result of compressing `input_root` with `settings`.
pub fn estimate(input_root: &Path, settings: &CompressionSettings) -> Result<EstimateReport> {
    estimate_with_rng(input_root, settings, &mut rand::thread_rng())
}

/// [`estimate`] with an explicit random source for the sample selection.
///
/// # Arguments
/// * `input_root` - Directory tree to estimate
/// * `settings` - Settings the batch run would use
/// * `rng` - Random source for picking the sample
///
/// # Returns
/// * `Ok(EstimateReport)` - Projection for the whole tree
/// * `Err(CompressionError::NoImageFilesFound)` - The tree holds no supported image
/// * `Err(CompressionError)` - The scan or the scratch directory failed
pub fn estimate_with_rng<R: Rng + ?Sized>(
    input_root: &Path,
    settings: &CompressionSettings,
    rng: &mut R,
) -> Result<EstimateReport> {
    estimate_in(input_root, settings, rng, &std::env::temp_dir())
}

/// [`estimate_with_rng`] with the scratch directory created under `scratch_parent`.
///
/// Each sample output is deleted right after it is measured and the scratch
/// directory is removed before returning.
pub fn estimate_in<R: Rng + ?Sized>(
    input_root: &Path,
    settings: &CompressionSettings,
    rng: &mut R,
    scratch_parent: &Path,
) -> Result<EstimateReport> {
    let files = scan(input_root)?;
    if files.is_empty() {
        return Err(CompressionError::NoImageFilesFound(input_root.to_path_buf()));
    }

    let total_original = total_size(&files);
    let sample_count = sample_size(files.len());
    let samples = sample_files(&files, sample_count, rng);
    info!(
        "Estimating {} files from a sample of {}",
        files.len(),
        sample_count
    );

    let scratch = tempfile::Builder::new()
        .prefix(ESTIMATE_SCRATCH_PREFIX)
        .tempdir_in(scratch_parent)?;

    let mut sample_original = 0u64;
    let mut sample_compressed = 0u64;
    let mut sample_results = Vec::with_capacity(samples.len());

    for (index, file) in samples.iter().enumerate() {
        let scratch_path = scratch
            .path()
            .join(format!("sample_{}_{}", index, file.file_name));
        let outcome = compress_file(file, &scratch_path, settings);

        if let CompressionOutcome::Succeeded(stats) = &outcome {
            sample_original += stats.original_size;
            sample_compressed += stats.compressed_size;
            sample_results.push(SampleResult {
                name: file.file_name.clone(),
                original_size: stats.original_size,
                compressed_size: stats.compressed_size,
                saved_percent: stats.saved_percent,
            });
        }

        // Also catches partial output left by a failure after the write.
        let written = resolve_output_path(file, &scratch_path, settings.output_format);
        if written.exists() {
            if let Err(e) = fs::remove_file(&written) {
                debug!("Could not remove scratch file {:?}: {}", written, e);
            }
        }
    }

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!("Failed to clean up scratch directory {:?}: {}", scratch_path, e);
    }

    let ratio = if sample_original > 0 {
        sample_compressed as f64 / sample_original as f64
    } else {
        1.0
    };
    let estimated_compressed = (total_original as f64 * ratio).round() as u64;
    let file_count = files.len();

    Ok(EstimateReport {
        file_count,
        original_size_bytes: total_original,
        estimated_compressed_size_bytes: estimated_compressed,
        estimated_saved_bytes: saved_bytes(total_original, estimated_compressed),
        estimated_saved_percent: saved_percent(total_original, estimated_compressed),
        sample_count,
        sample_results,
        average_original_size: (total_original as f64 / file_count as f64).round() as u64,
        average_estimated_size: (estimated_compressed as f64 / file_count as f64).round() as u64,
        metadata_report: analyze(&files),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn fake_records(root: &Path, count: usize) -> Vec<FileRecord> {
        (0..count)
            .map(|i| {
                let path = root.join(format!("file_{i:03}.jpg"));
                fs::write(&path, b"x").unwrap();
                FileRecord::from_path(root, &path).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_sample_size_bounds() {
        assert_eq!(sample_size(1), 1);
        assert_eq!(sample_size(3), 1);
        assert_eq!(sample_size(10), 1);
        assert_eq!(sample_size(11), 2);
        assert_eq!(sample_size(45), 5);
        assert_eq!(sample_size(100), 10);
        assert_eq!(sample_size(200), 10);
    }

    #[test]
    fn test_sample_files_is_deterministic_with_seed() {
        let temp_dir = TempDir::new().unwrap();
        let files = fake_records(temp_dir.path(), 30);

        let first: Vec<_> = sample_files(&files, 3, &mut StdRng::seed_from_u64(7))
            .into_iter()
            .map(|f| f.relative_path.clone())
            .collect();
        let second: Vec<_> = sample_files(&files, 3, &mut StdRng::seed_from_u64(7))
            .into_iter()
            .map(|f| f.relative_path.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_sample_files_without_replacement() {
        let temp_dir = TempDir::new().unwrap();
        let files = fake_records(temp_dir.path(), 12);

        let sample = sample_files(&files, 10, &mut StdRng::seed_from_u64(99));
        let unique: HashSet<_> = sample.iter().map(|f| &f.relative_path).collect();
        assert_eq!(sample.len(), 10);
        assert_eq!(unique.len(), 10);

        let all = sample_files(&files, 50, &mut StdRng::seed_from_u64(99));
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn test_estimate_empty_tree_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("readme.txt"), b"no images").unwrap();

        let result = estimate(temp_dir.path(), &CompressionSettings::default());
        assert!(matches!(result, Err(CompressionError::NoImageFilesFound(_))));
    }

    #[test]
    fn test_estimate_empty_tree_creates_no_scratch_dir() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let scratch_parent = temp_dir.path().join("scratch");
        fs::create_dir(&input).unwrap();
        fs::create_dir(&scratch_parent).unwrap();

        let result = estimate_in(
            &input,
            &CompressionSettings::default(),
            &mut StdRng::seed_from_u64(1),
            &scratch_parent,
        );
        assert!(matches!(result, Err(CompressionError::NoImageFilesFound(_))));
        assert_eq!(fs::read_dir(&scratch_parent).unwrap().count(), 0);
    }

    #[test]
    fn test_estimate_all_samples_fail_means_no_savings() {
        let temp_dir = TempDir::new().unwrap();
        fake_records(temp_dir.path(), 3);

        let report = estimate_with_rng(
            temp_dir.path(),
            &CompressionSettings::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        assert_eq!(report.file_count, 3);
        assert_eq!(report.sample_count, 1);
        assert!(report.sample_results.is_empty());
        assert_eq!(report.original_size_bytes, 3);
        assert_eq!(report.estimated_compressed_size_bytes, 3);
        assert_eq!(report.estimated_saved_bytes, 0);
        assert_eq!(report.estimated_saved_percent, 0.0);
        assert_eq!(report.average_original_size, 1);
        assert_eq!(report.metadata_report.total_files, 3);
    }
}
