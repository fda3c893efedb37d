pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Extensions accepted by the scanner, lowercase and without the dot.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "tiff", "tif", "gif", "avif"];

/// Files inspected by the capture-date analysis (a prefix of the scan).
pub const METADATA_SAMPLE_LIMIT: usize = 50;
/// Example paths lacking a capture date kept in a report.
pub const MISSING_DATE_EXAMPLES: usize = 10;

pub const ESTIMATE_SAMPLE_FRACTION: f64 = 0.10;
pub const ESTIMATE_MIN_SAMPLES: usize = 1;
pub const ESTIMATE_MAX_SAMPLES: usize = 10;
pub const ESTIMATE_SCRATCH_PREFIX: &str = "img-squeeze-estimate";

/// `YYYY:MM:DD HH:mm:ss`, the EXIF date-time layout.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

pub const PNG_OPTIMIZATION_PRESET: u8 = 6;
/// libdeflate's highest level. PNG is lossless, so effort is never traded away.
pub const LIBDEFLATER_MAX_LEVEL: u8 = 12;

/// libwebp `method`, 6 is the slowest and smallest.
pub const WEBP_MAX_EFFORT: i32 = 6;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
