//! Command-line driver for the grid engine.
//!
//! Reads fields and point sets as JSON, runs one engine operation and
//! writes the result as JSON to a file or stdout.

mod commands;
mod io;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use grid_engine::EngineConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "regrid")]
#[command(about = "Grid sampling, scatter interpolation and reprojection")]
struct Args {
    /// Engine configuration file (YAML); falls back to GRID_* environment variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    // Logs go to stderr so stdout carries only the JSON result
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let config = EngineConfig::from_env();
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("invalid GRID_* environment: {}", e))?;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = load_config(args.config.as_ref())?;
    info!(
        missing_value = config.missing_value,
        interpolation = %config.interpolation,
        "Loaded configuration"
    );

    let output = commands::run(&args.command, &config)?;
    io::write_json(&output, args.output.as_deref())
}
