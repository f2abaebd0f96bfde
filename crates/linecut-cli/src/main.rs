//! CLI application for extracting text line crops from ALTO documents.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{convert, inspect};

/// Extract per-line image crops and transcriptions from ALTO-XML layouts
#[derive(Parser)]
#[command(name = "linecut")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of ALTO/image pairs into line crops
    Convert(convert::ConvertArgs),

    /// List the text lines of a single ALTO document
    Inspect(inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Convert(args) => convert::run(args, cli.config.as_deref()).await,
        Commands::Inspect(args) => inspect::run(args).await,
    }
}
