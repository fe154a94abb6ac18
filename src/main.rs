mod core;
mod decoder;
mod shared;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::core::batch;
use crate::core::catalog;
use crate::core::config::{ConfigOverrides, ExtractionConfig};
use crate::decoder::OpenCvSource;

#[derive(Parser)]
#[command(author, version, about = "Extract weighbridge transaction frames from CCTV recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one frame per transaction into the output directory
    Extract(RunArgs),
    /// Build the video catalog and print it as JSON
    Catalog(RunArgs),
    /// Print the effective configuration as JSON
    Config(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Config file with `key = value` lines (default: ./weighframe.config if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Transaction log (JSON array)
    #[arg(short, long)]
    transactions: Option<PathBuf>,
    /// Directory holding the recorder files
    #[arg(short, long)]
    video_dir: Option<PathBuf>,
    /// Directory the extracted images are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Substring a recorder filename must contain
    #[arg(short, long)]
    pattern: Option<String>,
    /// Seconds the weighbridge clock runs ahead of the recorder
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<i64>,
    /// chrono format of "Transaction DateTime"
    #[arg(long)]
    date_format: Option<String>,
}

impl RunArgs {
    fn resolve(&self) -> Result<ExtractionConfig> {
        let overrides = ConfigOverrides {
            transactions_path: self.transactions.clone(),
            video_dir: self.video_dir.clone(),
            output_dir: self.output_dir.clone(),
            video_pattern: self.pattern.clone(),
            datetime_format: self.date_format.clone(),
            clock_offset_secs: self.offset,
        };
        ExtractionConfig::load(self.config.as_deref(), &overrides)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    crate::utils::logger::init(&std::env::current_dir().unwrap_or_default());

    match &cli.command {
        Commands::Extract(args) => {
            let config = args.resolve()?;
            crate::utils::logger::info(&format!("extract: {:?}", config));
            batch::run_batch(&config, &OpenCvSource)?;
        }
        Commands::Catalog(args) => {
            let config = args.resolve()?;
            let (catalog, skipped) =
                catalog::build_catalog(&config.video_dir, &config.video_pattern, &OpenCvSource)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "videos": catalog.entries(),
                    "skipped": skipped,
                }))?
            );
        }
        Commands::Config(args) => {
            let config = args.resolve()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
