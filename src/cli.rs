use crate::config::CompressionSettings;
use crate::error::Result;
use crate::formats::OutputFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-squeeze",
    about = "Batch image compression for whole directory trees",
    long_about = "img-squeeze recompresses every supported image under a directory into a mirrored \
                  output tree. It can preview a tree, estimate the savings from a random sample, \
                  keep or synthesise capture dates and carry over file timestamps.",
    version,
    after_help = "EXAMPLES:\n  \
    img-squeeze scan ./photos\n  \
    img-squeeze estimate ./photos -q 75 --seed 42\n  \
    img-squeeze batch ./photos ./compressed -q 80 -m 2048 -f webp\n  \
    img-squeeze compress photo.jpg small.jpg -q 70"
)]
pub struct Args {
    /// Show debug logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Print machine-readable JSON instead of the console report
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Preview the images in a directory tree",
        long_about = "List every supported image under a directory, its total size and how many \
                      files appear to carry an embedded capture date. Nothing is written."
    )]
    Scan {
        #[arg(help = "Directory to scan")]
        input: PathBuf,
    },

    #[command(
        about = "Estimate savings from a random sample",
        long_about = "Compress a random sample of up to 10 files into a scratch directory and \
                      project the measured ratio onto the whole tree. The scratch directory is \
                      removed afterwards."
    )]
    Estimate {
        #[arg(help = "Directory to estimate")]
        input: PathBuf,

        #[arg(long, help = "Seed for a reproducible sample")]
        seed: Option<u64>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    #[command(
        about = "Compress a directory tree into a mirrored output tree",
        long_about = "Compress every supported image under INPUT into the same relative location \
                      under OUTPUT. Files that fail are reported and skipped."
    )]
    Batch {
        #[arg(help = "Input directory")]
        input: PathBuf,

        #[arg(help = "Output directory")]
        output: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    #[command(about = "Compress a single image file")]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path")]
        output: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(
        short = 'q',
        long,
        help = "Compression quality (1-100, default: 80)",
        long_help = "Encoder quality from 1 (lowest) to 100 (highest) for JPEG and WebP. \
                     PNG stays lossless and is always optimised at maximum effort."
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'm',
        long,
        help = "Maximum width or height in pixels",
        long_help = "Shrink images whose longer edge exceeds this many pixels, preserving aspect \
                     ratio. Smaller images are left at their size."
    )]
    pub max_dimension: Option<u32>,

    #[arg(
        short = 'f',
        long,
        value_parser = parse_output_format,
        help = "Output format (original, webp)"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Drop embedded metadata from every output")]
    pub strip_metadata: bool,

    #[arg(
        long,
        conflicts_with = "strip_metadata",
        help = "Write a capture date from the file's mtime when none is embedded"
    )]
    pub auto_tag_date: bool,

    #[arg(long, help = "Do not copy access/modification times onto outputs")]
    pub no_preserve_timestamps: bool,

    #[arg(short = 'c', long, help = "JSON settings file; flags override its values")]
    pub config: Option<PathBuf>,
}

fn parse_output_format(value: &str) -> std::result::Result<OutputFormat, String> {
    value.parse::<OutputFormat>().map_err(|_| {
        format!(
            "unsupported format '{}', expected one of: {}",
            value,
            OutputFormat::format_names().join(", ")
        )
    })
}

impl SettingsArgs {
    /// Builds validated settings: file values first, then explicit flags.
    pub fn resolve(&self) -> Result<CompressionSettings> {
        let mut settings = match &self.config {
            Some(path) => CompressionSettings::from_file(path)?,
            None => CompressionSettings::default(),
        };

        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(max_dimension) = self.max_dimension {
            settings.max_dimension = Some(max_dimension);
        }
        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if self.strip_metadata {
            settings.preserve_metadata = false;
        }
        if self.auto_tag_date {
            settings.auto_tag_capture_date = true;
        }
        if self.no_preserve_timestamps {
            settings.preserve_timestamps = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}
