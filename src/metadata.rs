//! Capture-date inspection and metadata policy.
//!
//! Detection parses the EXIF block and looks for `DateTime`,
//! `DateTimeOriginal` or `DateTimeDigitized` in any IFD. Writing goes through
//! `little_exif`, which can patch JPEG, PNG, WebP and TIFF containers in place.
//!
//! `little_exif` stores PNG EXIF as a `Raw profile type exif` text chunk, which
//! `kamadak-exif` only understands in its `eXIf` form. PNGs carrying that chunk
//! are therefore read back through `little_exif`.

use crate::config::CompressionSettings;
use crate::constants::{EXIF_DATE_FORMAT, METADATA_SAMPLE_LIMIT, MISSING_DATE_EXAMPLES};
use crate::error::{CompressionError, Result};
use crate::formats::SourceFormat;
use crate::scanner::FileRecord;
use chrono::{DateTime, Local};
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

const CAPTURE_DATE_TAGS: [exif::Tag; 3] = [
    exif::Tag::DateTimeOriginal,
    exif::Tag::DateTimeDigitized,
    exif::Tag::DateTime,
];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_RAW_EXIF_KEYWORD: &[u8] = b"Raw profile type exif";

/// Capture-date coverage of a file list, extrapolated from a prefix sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataSampleReport {
    pub total_files: usize,
    pub estimated_has_date_tag: usize,
    pub estimated_missing_date_tag: usize,
    pub sample_size: usize,
    /// Relative paths of sampled files without a capture date, at most ten
    pub example_missing_paths: Vec<PathBuf>,
}

/// What the compressor does with embedded metadata for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataAction {
    /// Write the output without any metadata
    Strip,
    /// Copy the source's EXIF block unchanged
    CarryOver,
    /// Copy the source's EXIF block and add this capture date
    TagCaptureDate(String),
}

/// Where a file's EXIF block was found.
enum EmbeddedExif {
    Missing,
    Standard(exif::Exif),
    PngTextChunk,
}

fn locate_exif(path: &Path) -> Result<EmbeddedExif> {
    if let Some(exif) = read_exif(path)? {
        return Ok(EmbeddedExif::Standard(exif));
    }
    if SourceFormat::from_path(path) == Some(SourceFormat::Png) && png_has_raw_exif(path)? {
        return Ok(EmbeddedExif::PngTextChunk);
    }
    Ok(EmbeddedExif::Missing)
}

/// Walks the PNG chunk list looking for a `tEXt`/`zTXt`/`iTXt` chunk whose
/// keyword is `Raw profile type exif`.
fn png_has_raw_exif(path: &Path) -> Result<bool> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut signature = [0u8; 8];
    if reader.read_exact(&mut signature).is_err() || signature != PNG_SIGNATURE {
        return Ok(false);
    }

    let mut header = [0u8; 8];
    while reader.read_exact(&mut header).is_ok() {
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let kind = &header[4..8];
        if kind == b"IEND" {
            break;
        }

        let mut consumed = 0usize;
        if matches!(kind, b"tEXt" | b"zTXt" | b"iTXt") {
            // Keyword plus its NUL terminator
            let mut keyword = vec![0u8; length.min(PNG_RAW_EXIF_KEYWORD.len() + 1)];
            reader.read_exact(&mut keyword)?;
            consumed = keyword.len();
            if keyword.len() == PNG_RAW_EXIF_KEYWORD.len() + 1
                && keyword[..PNG_RAW_EXIF_KEYWORD.len()].eq_ignore_ascii_case(PNG_RAW_EXIF_KEYWORD)
                && keyword[PNG_RAW_EXIF_KEYWORD.len()] == 0
            {
                return Ok(true);
            }
        }

        // Rest of the data, then the CRC
        reader.seek_relative((length - consumed) as i64 + 4)?;
    }

    Ok(false)
}

fn load_little_exif(path: &Path) -> Result<Metadata> {
    Metadata::new_from_path(path)
        .map_err(|e| CompressionError::MetadataRead(path.to_path_buf(), e.to_string()))
}

/// True when `source` has an EXIF block either reader can see. Read errors count as none.
fn source_has_exif(source: &Path) -> bool {
    matches!(
        locate_exif(source),
        Ok(EmbeddedExif::Standard(_) | EmbeddedExif::PngTextChunk)
    )
}

fn read_exif(path: &Path) -> Result<Option<exif::Exif>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(CompressionError::MetadataRead(path.to_path_buf(), e.to_string())),
    }
}

/// Returns the first embedded capture date, if any.
pub fn read_capture_date(path: &Path) -> Result<Option<String>> {
    match locate_exif(path)? {
        EmbeddedExif::Standard(exif) => Ok(capture_date_from_exif(&exif)),
        EmbeddedExif::PngTextChunk => capture_date_from_little_exif(path),
        EmbeddedExif::Missing => Ok(None),
    }
}

fn capture_date_from_exif(exif: &exif::Exif) -> Option<String> {
    for tag in CAPTURE_DATE_TAGS {
        let Some(field) = exif.fields().find(|field| field.tag == tag) else {
            continue;
        };
        if let exif::Value::Ascii(ref values) = field.value {
            if let Some(first) = values.iter().find(|v| !v.is_empty()) {
                let text = String::from_utf8_lossy(first);
                return Some(text.trim_end_matches('\0').to_string());
            }
        }
    }

    None
}

fn capture_date_from_little_exif(path: &Path) -> Result<Option<String>> {
    let metadata = load_little_exif(path)?;
    let wanted = [
        ExifTag::DateTimeOriginal(String::new()),
        ExifTag::CreateDate(String::new()),
        ExifTag::ModifyDate(String::new()),
    ];

    for kind in &wanted {
        for tag in metadata.get_tag(kind) {
            if let ExifTag::DateTimeOriginal(value)
            | ExifTag::CreateDate(value)
            | ExifTag::ModifyDate(value) = tag
            {
                let value = value.trim_end_matches('\0');
                if !value.is_empty() {
                    return Ok(Some(value.to_string()));
                }
            }
        }
    }

    Ok(None)
}

/// Whether `path` carries an embedded capture date.
///
/// Unreadable metadata counts as "no date" and is logged, never raised.
pub fn has_capture_date(path: &Path) -> bool {
    match read_capture_date(path) {
        Ok(date) => date.is_some(),
        Err(e) => {
            warn!("Could not read metadata of {:?}: {}", path, e);
            false
        }
    }
}

/// Formats `time` in the host's local zone as `YYYY:MM:DD HH:mm:ss`.
pub fn format_capture_date(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format(EXIF_DATE_FORMAT).to_string()
}

/// Inspects the first `min(50, files.len())` records and scales the counts up
/// to the whole list.
pub fn analyze(files: &[FileRecord]) -> MetadataSampleReport {
    let total_files = files.len();
    let sample_size = total_files.min(METADATA_SAMPLE_LIMIT);

    let mut has_count = 0usize;
    let mut missing_count = 0usize;
    let mut example_missing_paths = Vec::new();

    for file in &files[..sample_size] {
        if has_capture_date(&file.absolute_path) {
            has_count += 1;
        } else {
            missing_count += 1;
            if example_missing_paths.len() < MISSING_DATE_EXAMPLES {
                example_missing_paths.push(file.relative_path.clone());
            }
        }
    }

    let extrapolate = |count: usize| -> usize {
        if sample_size == 0 {
            return 0;
        }
        (count as f64 * total_files as f64 / sample_size as f64).round() as usize
    };

    MetadataSampleReport {
        total_files,
        estimated_has_date_tag: extrapolate(has_count),
        estimated_missing_date_tag: extrapolate(missing_count),
        sample_size,
        example_missing_paths,
    }
}

/// Decides the metadata handling for `file` under `settings`.
pub fn plan_metadata(file: &FileRecord, settings: &CompressionSettings) -> MetadataAction {
    if !settings.preserve_metadata {
        return MetadataAction::Strip;
    }
    if settings.tags_capture_date() && !has_capture_date(&file.absolute_path) {
        return MetadataAction::TagCaptureDate(format_capture_date(file.modified));
    }
    MetadataAction::CarryOver
}

/// Applies `action` to an already written `output` in `target` format.
///
/// Re-encoding never copies metadata, so `Strip` has nothing left to do.
pub fn apply_metadata(
    action: &MetadataAction,
    source: &Path,
    output: &Path,
    target: SourceFormat,
) -> Result<()> {
    if *action == MetadataAction::Strip {
        return Ok(());
    }
    if !target.supports_exif() {
        debug!("{} output cannot carry EXIF, skipping metadata for {:?}", target, output);
        return Ok(());
    }

    match action {
        MetadataAction::Strip => Ok(()),
        MetadataAction::CarryOver => {
            if !source_has_exif(source) {
                return Ok(());
            }
            let metadata = load_little_exif(source)?;
            write_metadata(&metadata, output)
        }
        MetadataAction::TagCaptureDate(date) => {
            let mut metadata = if source_has_exif(source) {
                load_little_exif(source).unwrap_or_else(|_| Metadata::new())
            } else {
                Metadata::new()
            };
            metadata.set_tag(ExifTag::ModifyDate(date.clone()));
            metadata.set_tag(ExifTag::DateTimeOriginal(date.clone()));
            metadata.set_tag(ExifTag::CreateDate(date.clone()));
            debug!("Tagging {:?} with capture date {}", output, date);
            write_metadata(&metadata, output)
        }
    }
}

fn write_metadata(metadata: &Metadata, output: &Path) -> Result<()> {
    metadata
        .write_to_file(output)
        .map_err(|e| CompressionError::MetadataWrite(output.to_path_buf(), e.to_string()))
}
