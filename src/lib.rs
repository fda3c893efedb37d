pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimator;
pub mod formats;
pub mod info;
pub mod logger;
pub mod metadata;
pub mod processing;
pub mod scanner;
pub mod utils;

pub use batch::{compress_all, BatchStatistics, BatchSummary, ProgressEvent};
pub use config::CompressionSettings;
pub use error::{CompressionError, Result};
pub use estimator::{
    estimate, estimate_in, estimate_with_rng, sample_size, EstimateReport, SampleResult,
};
pub use formats::{OutputFormat, SourceFormat};
pub use info::{scan_directory, ScanReport};
pub use metadata::{analyze, has_capture_date, read_capture_date, MetadataSampleReport};
pub use processing::{
    compress_file, fit_inside, resize_image, CompressionOutcome, CompressionStats,
};
pub use scanner::{is_image_file, scan, FileRecord};
