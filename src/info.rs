use crate::batch::BatchStatistics;
use crate::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, ERROR_PREFIX, INFO_PREFIX,
    ORIGINAL_SIZE_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX,
};
use crate::error::Result;
use crate::estimator::EstimateReport;
use crate::metadata::{analyze, MetadataSampleReport};
use crate::processing::CompressionOutcome;
use crate::scanner::{scan, total_size, FileRecord};
use crate::utils::{format_file_size, format_signed_size};
use serde::Serialize;
use std::path::Path;

/// Read-only preview of a directory tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileRecord>,
    pub file_count: usize,
    pub total_size: u64,
    pub metadata_report: MetadataSampleReport,
}

/// Scans `root` and inspects capture-date coverage of what it found.
pub fn scan_directory(root: &Path) -> Result<ScanReport> {
    let files = scan(root)?;
    let total_size = total_size(&files);
    let metadata_report = analyze(&files);

    Ok(ScanReport {
        file_count: files.len(),
        total_size,
        metadata_report,
        files,
    })
}

fn print_metadata_report(report: &MetadataSampleReport) {
    println!("\n🕒 Capture dates (sampled {} of {}):", report.sample_size, report.total_files);
    println!("  {} With capture date: ~{}", SUCCESS_PREFIX, report.estimated_has_date_tag);
    println!(
        "  {}  Missing capture date: ~{}",
        WARNING_PREFIX, report.estimated_missing_date_tag
    );
    for path in &report.example_missing_paths {
        println!("    - {}", path.display());
    }
}

pub fn print_scan_report(root: &Path, report: &ScanReport) {
    println!("{} Scanned: {:?}", INFO_PREFIX, root);
    println!("  📁 Image files: {}", report.file_count);
    println!(
        "  📦 Total size: {} ({} bytes)",
        format_file_size(report.total_size),
        report.total_size
    );
    if report.file_count > 0 {
        print_metadata_report(&report.metadata_report);
    }
}

pub fn print_estimate_report(root: &Path, report: &EstimateReport) {
    println!("{} Estimate for: {:?}", INFO_PREFIX, root);
    println!("  📁 Image files: {}", report.file_count);
    println!(
        "  🧪 Samples compressed: {} of {}",
        report.sample_results.len(),
        report.sample_count
    );
    for sample in &report.sample_results {
        println!(
            "    - {}: {} -> {} ({:.2}%)",
            sample.name,
            format_file_size(sample.original_size),
            format_file_size(sample.compressed_size),
            sample.saved_percent
        );
    }
    println!(
        "  {} {}",
        ORIGINAL_SIZE_PREFIX,
        format_file_size(report.original_size_bytes)
    );
    println!(
        "  {} ~{}",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(report.estimated_compressed_size_bytes)
    );
    println!(
        "  💾 Estimated savings: {} ({:.2}%)",
        format_signed_size(report.estimated_saved_bytes),
        report.estimated_saved_percent
    );
    println!(
        "  📐 Average file size: {} -> ~{}",
        format_file_size(report.average_original_size),
        format_file_size(report.average_estimated_size)
    );
    print_metadata_report(&report.metadata_report);
}

pub fn print_batch_summary(statistics: &BatchStatistics) {
    let summary = statistics.summary();
    println!("\n📊 Batch Compression Summary:");
    println!("  📁 Total files: {}", summary.total);
    println!("  {} Succeeded: {}", SUCCESS_PREFIX, summary.succeeded);
    if summary.failed > 0 {
        println!("  {}  Failed: {}", WARNING_PREFIX, summary.failed);
    }
    println!(
        "  {} {} bytes ({})",
        ORIGINAL_SIZE_PREFIX,
        summary.original_size_bytes,
        format_file_size(summary.original_size_bytes)
    );
    println!(
        "  {} {} bytes ({})",
        COMPRESSED_SIZE_PREFIX,
        summary.compressed_size_bytes,
        format_file_size(summary.compressed_size_bytes)
    );
    println!("  💾 Saved: {}", format_signed_size(summary.saved_bytes));
    println!("  {} {:.2}%", COMPRESSION_RATIO_PREFIX, summary.saved_percent);
    println!("  ⏱️  Total time: {:.2?}", statistics.elapsed);
}

pub fn print_outcome(input: &Path, outcome: &CompressionOutcome) {
    match outcome {
        CompressionOutcome::Succeeded(stats) => {
            println!("🗜️  Compressed: {:?}", input);
            println!("📁 Output: {:?}", stats.output_path);
            println!(
                "{} {} bytes ({})",
                ORIGINAL_SIZE_PREFIX,
                stats.original_size,
                format_file_size(stats.original_size)
            );
            println!(
                "{} {} bytes ({})",
                COMPRESSED_SIZE_PREFIX,
                stats.compressed_size,
                format_file_size(stats.compressed_size)
            );
            println!("{} {:.2}%", COMPRESSION_RATIO_PREFIX, stats.saved_percent);

            if stats.saved_bytes > 0 {
                println!(
                    "{} Successfully reduced file size by {:.2}%",
                    SUCCESS_PREFIX, stats.saved_percent
                );
            } else {
                println!(
                    "{}  File size increased by {:.2}%",
                    WARNING_PREFIX,
                    stats.saved_percent.abs()
                );
            }
        }
        CompressionOutcome::Failed { error_message } => {
            println!("{} Failed to compress {:?}: {}", ERROR_PREFIX, input, error_message);
        }
    }
}
