use anyhow::{bail, Context, Result};
use clap::Parser;
use img_squeeze::batch::{compress_all, ProgressEvent};
use img_squeeze::cli::{Args, Commands};
use img_squeeze::estimator::{estimate, estimate_with_rng};
use img_squeeze::info::{
    print_batch_summary, print_estimate_report, print_outcome, print_scan_report, scan_directory,
};
use img_squeeze::processing::{compress_file, CompressionOutcome};
use img_squeeze::scanner::FileRecord;
use img_squeeze::utils::{create_progress_bar, create_progress_spinner, format_signed_size};
use img_squeeze::{logger, CompressionError};
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.quiet);

    match args.command {
        Commands::Scan { input } => {
            let report = scan_directory(&input)
                .with_context(|| format!("Failed to scan {:?}", input))?;
            if args.json {
                print_json(&report)?;
            } else {
                print_scan_report(&input, &report);
            }
        }
        Commands::Estimate { input, seed, settings } => {
            let settings = settings.resolve().context("Invalid compression settings")?;

            let spinner = if args.json || args.quiet {
                ProgressBar::hidden()
            } else {
                create_progress_spinner("Compressing sample files...")
            };
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));

            let report = match seed {
                Some(seed) => estimate_with_rng(&input, &settings, &mut StdRng::seed_from_u64(seed)),
                None => estimate(&input, &settings),
            };
            spinner.finish_and_clear();
            let report = report.with_context(|| format!("Failed to estimate {:?}", input))?;

            if args.json {
                print_json(&report)?;
            } else {
                print_estimate_report(&input, &report);
            }
        }
        Commands::Batch { input, output, settings } => {
            let settings = settings.resolve().context("Invalid compression settings")?;

            let mut progress: Option<ProgressBar> = None;
            let hide_progress = args.json || args.quiet;
            let mut on_progress = |event: &ProgressEvent| {
                let pb = progress.get_or_insert_with(|| {
                    if hide_progress {
                        ProgressBar::hidden()
                    } else {
                        create_progress_bar(event.total as u64)
                    }
                });
                pb.set_position(event.current_index as u64);
                pb.set_message(format!(
                    "{} (saved {})",
                    event.current_file_name,
                    format_signed_size(event.cumulative_saved_bytes)
                ));
            };

            let statistics = compress_all(&input, &output, &settings, Some(&mut on_progress))
                .with_context(|| format!("Batch compression of {:?} failed", input))?;
            if let Some(pb) = progress {
                pb.finish_with_message("Batch compression completed");
            }

            if args.json {
                print_json(&statistics.summary())?;
            } else {
                print_batch_summary(&statistics);
            }
        }
        Commands::Compress { input, output, settings } => {
            let settings = settings.resolve().context("Invalid compression settings")?;
            let file = single_file_record(&input)?;

            let outcome = compress_file(&file, &output, &settings);
            if args.json {
                print_json(&outcome)?;
            } else {
                print_outcome(&input, &outcome);
            }

            if let CompressionOutcome::Failed { error_message } = outcome {
                bail!("Failed to compress {:?}: {}", input, error_message);
            }
        }
    }

    Ok(())
}

/// Builds a record for a lone file, rooted at its own directory.
fn single_file_record(input: &Path) -> Result<FileRecord> {
    if !input.is_file() {
        return Err(CompressionError::FileNotFound(input.to_path_buf()).into());
    }
    let root = input.parent().unwrap_or_else(|| Path::new(""));
    FileRecord::from_path(root, input).with_context(|| format!("Failed to read {:?}", input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise report")?;
    println!("{}", json);
    Ok(())
}
