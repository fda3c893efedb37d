//! Image format utilities and type-safe format handling
//!
//! `SourceFormat` identifies the codec a scanned file was written with, and
//! `OutputFormat` is the user's choice between keeping that codec or
//! normalising everything to WebP.

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Requested output format for a compression run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Re-encode with the source file's own codec
    #[default]
    Original,
    /// Convert every image to WebP
    WebP,
}

impl OutputFormat {
    /// Format names for CLI help text
    pub fn format_names() -> Vec<&'static str> {
        vec!["original", "webp"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Original => "original",
            OutputFormat::WebP => "webp",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "original" => Ok(OutputFormat::Original),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Codec of a supported input file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
    Gif,
    Avif,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "webp" => Some(SourceFormat::WebP),
            "tiff" | "tif" => Some(SourceFormat::Tiff),
            "gif" => Some(SourceFormat::Gif),
            "avif" => Some(SourceFormat::Avif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::WebP => ImageFormat::WebP,
            SourceFormat::Tiff => ImageFormat::Tiff,
            SourceFormat::Gif => ImageFormat::Gif,
            SourceFormat::Avif => ImageFormat::Avif,
        }
    }

    /// Whether the container can carry an EXIF block we know how to write.
    pub fn supports_exif(self) -> bool {
        matches!(
            self,
            SourceFormat::Jpeg | SourceFormat::Png | SourceFormat::WebP | SourceFormat::Tiff
        )
    }

    /// Codec used for the output of a file in this format.
    pub fn target(self, output: OutputFormat) -> SourceFormat {
        match output {
            OutputFormat::Original => self,
            OutputFormat::WebP => SourceFormat::WebP,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::WebP => "WebP",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::Gif => "GIF",
            SourceFormat::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}
