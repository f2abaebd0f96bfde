//! Convert command - batch extraction over a directory of document pairs.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use linecut_core::config::LinecutConfig;
use linecut_core::pairs::scan_directory;
use linecut_core::pipeline::process_pair;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input directory containing ALTO-XML files and page images
    #[arg(short, long, default_value = "data")]
    input: PathBuf,

    /// Output directory for cropped images and transcriptions
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Continue with the next pair when one fails
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        LinecutConfig::from_file(std::path::Path::new(path))?
    } else {
        LinecutConfig::default()
    };

    fs::create_dir_all(&args.input)?;
    fs::create_dir_all(&args.output)?;

    let report = scan_directory(&args.input, &config)?;

    for xml in &report.unmatched {
        println!(
            "{} No matching image file found for {}",
            style("⚠").yellow(),
            xml.display()
        );
    }

    if report.pairs.is_empty() {
        println!(
            "{} No document pairs found in {}",
            style("ℹ").blue(),
            args.input.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} document pairs",
        style("ℹ").blue(),
        report.pairs.len()
    );

    // Set up progress bar
    let pb = ProgressBar::new(report.pairs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs")
            .unwrap()
            .progress_chars("=>-"),
    );

    let continue_on_error = args.continue_on_error || config.continue_on_error;

    let mut total_lines = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for pair in &report.pairs {
        match process_pair(pair, &args.output) {
            Ok(count) => {
                debug!(
                    "Processed {} ({} lines)",
                    pair.xml_path.display(),
                    count
                );
                total_lines += count;
            }
            Err(e) => {
                if continue_on_error {
                    warn!("Failed to process {}: {}", pair.xml_path.display(), e);
                    failed.push((pair.xml_path.clone(), e.to_string()));
                } else {
                    pb.abandon();
                    anyhow::bail!(
                        "Failed to process {}: {}",
                        pair.xml_path.display(),
                        e
                    );
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Print summary
    println!();
    println!(
        "{} Processed {} pairs ({} lines) in {:?}",
        style("✓").green(),
        report.pairs.len() - failed.len(),
        total_lines,
        start.elapsed()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed pairs:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}
