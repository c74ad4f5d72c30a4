//! Relive CLI - record, replay and inspect state loops
//!
//! # Commands
//!
//! - `relive demo` - Record a simulated host, then replay it in a loop and verify each pass
//! - `relive inspect` - Report state files and input logs in a loop directory
//! - `relive config` - Print (or write) the effective configuration
//!
//! # Configuration (relive.toml)
//!
//! ```toml
//! [store]
//! slot_count = 4
//! directory = "/home/me/.local/share/relive/loops"
//!
//! [session]
//! default_slot = 0
//! ```

mod config;
mod demo;
mod inspect;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relive_core::LoopConfig;

/// Relive CLI - instant record and looping replay
#[derive(Parser)]
#[command(name = "relive")]
#[command(about = "Record, replay and inspect state loops")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a simulated host, then replay and verify the loop
    Demo(demo::DemoArgs),

    /// Report the contents of a loop directory
    Inspect(inspect::InspectArgs),

    /// Print the effective configuration as TOML
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(relive_core::config::default_config_path);
    let config = load_config(config_path.as_deref())?;

    match cli.command {
        Commands::Demo(args) => demo::execute(args, config),
        Commands::Inspect(args) => inspect::execute(args, &config),
        Commands::Config(args) => config::execute(args, &config, config_path.as_deref()),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<LoopConfig> {
    let Some(path) = path else {
        tracing::debug!("No config directory available, using defaults");
        return Ok(LoopConfig::default());
    };
    LoopConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}
