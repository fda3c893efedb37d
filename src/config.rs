//! Compression settings.
//!
//! Defaults are resolved once, when the settings are built at the host
//! boundary. Everything downstream takes a validated `CompressionSettings`
//! by reference and never falls back to defaults on its own.

use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    /// Encoder quality, 1-100
    pub quality: u8,
    /// Cap on the longer edge in pixels. Images are only ever shrunk.
    pub max_dimension: Option<u32>,
    pub output_format: OutputFormat,
    /// Keep embedded metadata. When false every output is written without it.
    pub preserve_metadata: bool,
    /// Synthesise a capture date from the file's mtime when none is embedded.
    /// Only honoured together with `preserve_metadata`.
    pub auto_tag_capture_date: bool,
    /// Copy the source's access and modification times onto the output.
    pub preserve_timestamps: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_dimension: None,
            output_format: OutputFormat::Original,
            preserve_metadata: true,
            auto_tag_capture_date: false,
            preserve_timestamps: true,
        }
    }
}

impl CompressionSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(CompressionError::InvalidQuality(self.quality));
        }
        if let Some(0) = self.max_dimension {
            return Err(CompressionError::InvalidMaxDimension(0));
        }
        Ok(())
    }

    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: CompressionSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// True when a capture date should be synthesised for untagged images.
    pub fn tags_capture_date(&self) -> bool {
        self.preserve_metadata && self.auto_tag_capture_date
    }
}
