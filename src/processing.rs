use crate::config::CompressionSettings;
use crate::constants::{LIBDEFLATER_MAX_LEVEL, PNG_OPTIMIZATION_PRESET, WEBP_MAX_EFFORT};
use crate::error::{CompressionError, Result};
use crate::formats::{OutputFormat, SourceFormat};
use crate::metadata::{apply_metadata, plan_metadata};
use crate::scanner::FileRecord;
use crate::utils::{saved_bytes, saved_percent};
use filetime::FileTime;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use oxipng::{Deflaters, Options};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::panic;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Sizes measured for one successfully compressed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    /// Where the output actually landed, after any extension rewrite
    pub output_path: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Negative when the re-encoded file is larger
    pub saved_bytes: i64,
    /// Two-decimal percentage of `original_size`
    pub saved_percent: f64,
}

/// Result of compressing one file. Failures never escape as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompressionOutcome {
    Succeeded(CompressionStats),
    Failed { error_message: String },
}

impl CompressionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompressionOutcome::Succeeded(_))
    }

    pub fn stats(&self) -> Option<&CompressionStats> {
        match self {
            CompressionOutcome::Succeeded(stats) => Some(stats),
            CompressionOutcome::Failed { .. } => None,
        }
    }
}

/// Compresses `file` into `output_path` according to `settings`.
///
/// The pipeline is: decode, fit-inside resize, encode in the target codec,
/// write, apply the metadata policy, measure the on-disk size, restore
/// timestamps.
///
/// # Arguments
/// * `file` - Scanned source image
/// * `output_path` - Requested destination; WebP conversion may swap its extension
/// * `settings` - Validated compression settings
///
/// # Returns
/// * `CompressionOutcome::Succeeded` with the measured sizes and the path written
/// * `CompressionOutcome::Failed` with the error text; the failure is logged
///   with the source path and never propagates
pub fn compress_file(
    file: &FileRecord,
    output_path: &Path,
    settings: &CompressionSettings,
) -> CompressionOutcome {
    match process_image_pipeline(file, output_path, settings) {
        Ok(stats) => CompressionOutcome::Succeeded(stats),
        Err(e) => {
            error!("Failed to compress {:?}: {}", file.absolute_path, e);
            CompressionOutcome::Failed {
                error_message: e.to_string(),
            }
        }
    }
}

/// Fallible core of [`compress_file`].
///
/// # Arguments
/// * `file` - Scanned source image
/// * `output_path` - Requested destination
/// * `settings` - Validated compression settings
///
/// # Returns
/// * `Ok(CompressionStats)` - Sizes read back from disk after the metadata step
/// * `Err(CompressionError)` - The first step that failed
pub fn process_image_pipeline(
    file: &FileRecord,
    output_path: &Path,
    settings: &CompressionSettings,
) -> Result<CompressionStats> {
    let source_format = SourceFormat::from_extension(&file.extension)
        .ok_or_else(|| CompressionError::UnsupportedFormat(file.extension.clone()))?;

    let mut img = load_image(&file.absolute_path)?;
    resize_image(&mut img, settings.max_dimension);

    let metadata_action = plan_metadata(file, settings);

    let target = source_format.target(settings.output_format);
    let final_path = resolve_output_path(file, output_path, settings.output_format);
    let encoded = encode_image(&img, target, settings.quality)?;

    ensure_parent_dir(&final_path)?;
    fs::write(&final_path, &encoded)?;
    apply_metadata(&metadata_action, &file.absolute_path, &final_path, target)?;

    // Measure the file, not the buffer: the metadata step may have grown it.
    let compressed_size = fs::metadata(&final_path)?.len();

    if settings.preserve_timestamps {
        filetime::set_file_times(
            &final_path,
            FileTime::from_system_time(file.accessed),
            FileTime::from_system_time(file.modified),
        )?;
    }

    debug!(
        "Compressed {:?} -> {:?}: {} -> {} bytes",
        file.absolute_path, final_path, file.size_bytes, compressed_size
    );

    Ok(CompressionStats {
        output_path: final_path,
        original_size: file.size_bytes,
        compressed_size,
        saved_bytes: saved_bytes(file.size_bytes, compressed_size),
        saved_percent: saved_percent(file.size_bytes, compressed_size),
    })
}

/// Decodes the image at `input_path`.
pub fn load_image(input_path: &Path) -> Result<DynamicImage> {
    if !input_path.exists() {
        return Err(CompressionError::FileNotFound(input_path.to_path_buf()));
    }
    let img = ImageReader::open(input_path)?.with_guessed_format()?.decode()?;
    Ok(img)
}

/// Target size for a fit-inside resize, or `None` when the image already fits.
///
/// The longer edge becomes `max_dimension`, the other edge keeps the aspect
/// ratio. Images are never enlarged.
pub fn fit_inside(width: u32, height: u32, max_dimension: Option<u32>) -> Option<(u32, u32)> {
    let max = max_dimension.filter(|&m| m > 0)?;
    if width <= max && height <= max {
        return None;
    }

    let longest = width.max(height) as f64;
    let scale = max as f64 / longest;
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max);
    Some((new_width, new_height))
}

pub fn resize_image(img: &mut DynamicImage, max_dimension: Option<u32>) {
    let (width, height) = img.dimensions();
    if let Some((new_width, new_height)) = fit_inside(width, height, max_dimension) {
        debug!(
            "Resizing {}x{} -> {}x{}",
            width, height, new_width, new_height
        );
        *img = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    }
}

/// Output path for `file` given the requested `output_path`.
///
/// WebP conversion swaps the extension unless the source already is WebP.
pub fn resolve_output_path(
    file: &FileRecord,
    output_path: &Path,
    output_format: OutputFormat,
) -> PathBuf {
    match output_format {
        OutputFormat::WebP if file.extension != "webp" => output_path.with_extension("webp"),
        _ => output_path.to_path_buf(),
    }
}

/// Encodes `img` in `target` with format-specific parameters.
pub fn encode_image(img: &DynamicImage, target: SourceFormat, quality: u8) -> Result<Vec<u8>> {
    match target {
        SourceFormat::Jpeg => encode_jpeg(img, quality),
        SourceFormat::Png => encode_png(img),
        SourceFormat::WebP => encode_webp(img, quality),
        // TIFF, GIF and AVIF keep their codec defaults
        other => {
            let mut cursor = Cursor::new(Vec::new());
            img.write_to(&mut cursor, other.to_image_format())?;
            Ok(cursor.into_inner())
        }
    }
}

/// Progressive mozjpeg encode with optimised Huffman tables and scans.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    // libjpeg reports fatal errors by unwinding
    panic::catch_unwind(|| -> std::io::Result<Vec<u8>> {
        let mut compress = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        compress.set_size(width as usize, height as usize);
        compress.set_quality(quality as f32);
        compress.set_optimize_coding(true);
        compress.set_progressive_mode();
        compress.set_optimize_scans(true);

        let mut started = compress.start_compress(Vec::new())?;
        started.write_scanlines(rgb.as_raw())?;
        started.finish()
    })
    .map_err(|_| CompressionError::JpegEncoding("mozjpeg aborted the encode".to_string()))?
    .map_err(CompressionError::from)
}

/// Lossless: `quality` has no PNG counterpart, effort is always maximal.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    img.write_with_encoder(PngEncoder::new_with_quality(
        &mut buffer,
        CompressionType::Best,
        PngFilter::Adaptive,
    ))?;

    let mut options = Options::from_preset(PNG_OPTIMIZATION_PRESET);
    options.palette_reduction = true;
    options.deflate = png_deflater();

    oxipng::optimize_from_memory(&buffer, &options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}

pub fn png_deflater() -> Deflaters {
    Deflaters::Libdeflater {
        compression: LIBDEFLATER_MAX_LEVEL,
    }
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // libwebp only accepts 8-bit RGB(A)
    let prepared = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&prepared)
        .map_err(|e| CompressionError::WebPEncoding(e.to_string()))?;
    let mut config = webp::WebPConfig::new()
        .map_err(|_| CompressionError::WebPEncoding("failed to initialise encoder config".into()))?;
    config.quality = quality as f32;
    config.method = WEBP_MAX_EFFORT;

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| CompressionError::WebPEncoding(format!("{:?}", e)))?;
    Ok(memory.to_vec())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|_| CompressionError::DirectoryCreationFailed(parent.to_path_buf()))?;
        }
    }
    Ok(())
}
