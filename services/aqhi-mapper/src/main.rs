//! AQHI mapper.
//!
//! Fetches the latest station readings and low-cost sensor snapshot,
//! interpolates station-only and blended AQHI surfaces over each configured
//! region, and writes one GeoJSON file per region and variant.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{load_config, LogFormat};
use pipeline::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "aqhi-mapper")]
#[command(about = "Interpolate AQHI surfaces over regions")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "AQHI_MAPPER_CONFIG", default_value = "config/aqhi-mapper.yaml")]
    config: PathBuf,

    /// Output directory (overrides output.dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only process these regions (repeatable)
    #[arg(short, long)]
    region: Vec<String>,

    /// Log level (overrides logging.level)
    #[arg(long)]
    log_level: Option<String>,

    /// Compute grids but do not write them
    #[arg(long)]
    dry_run: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(level: Level, format: LogFormat) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(&args.config)?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(config.logging.level.as_str());
    init_tracing(parse_level(level), config.logging.format)?;

    info!(
        config = %args.config.display(),
        regions = config.regions.len(),
        "Starting AQHI mapper"
    );

    let options = RunOptions {
        output_dir: args.output_dir.unwrap_or_else(|| config.output.dir.clone()),
        regions: args.region,
        dry_run: args.dry_run,
    };

    let summary = pipeline::run(&config, &options).await?;

    if summary.is_total_failure() {
        anyhow::bail!("No region grid was produced");
    }

    Ok(())
}
