//! Config command - show or persist the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use relive_core::LoopConfig;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub write: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs, config: &LoopConfig, path: Option<&Path>) -> Result<()> {
    config.validate().context("Configuration is invalid")?;

    if args.write {
        let path = path.context("No config path available; pass --config")?;
        config
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if let Some(path) = path {
        println!("# {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
