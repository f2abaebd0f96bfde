//! Inspect command - list the text lines of a single ALTO document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use linecut_core::alto::{AltoReader, LineRecord};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input ALTO-XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Readable line listing
    Text,
    /// JSON array of line records
    Json,
}

pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let reader = AltoReader::open(&args.input)?;
    let namespace = reader.namespace().to_string();
    let lines = reader
        .lines()
        .collect::<Result<Vec<LineRecord>, _>>()?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
        OutputFormat::Text => format_text(&namespace, &lines),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(namespace: &str, lines: &[LineRecord]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Namespace: {}\n", namespace));
    output.push_str(&format!("Lines: {}\n\n", lines.len()));

    for (i, line) in lines.iter().enumerate() {
        output.push_str(&format!(
            "line_{}: {}x{} at ({}, {})  {:?}\n",
            i, line.width, line.height, line.hpos, line.vpos, line.text
        ));
    }

    output
}
