//! Inspect command - report the state files and input logs in a loop directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use relive_core::{
    ErrorKind, InputLog, LogSummary, LoopConfig, MAX_SLOT_COUNT, SlotId, input_log_path,
    state_file_path,
};

use crate::demo::DemoInput;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Loop directory (defaults to store.directory)
    pub dir: Option<PathBuf>,

    /// Input record size in bytes (defaults to the demo's record size)
    #[arg(long)]
    pub record_size: Option<usize>,

    /// Number of slots to report (defaults to store.slot_count)
    #[arg(long)]
    pub slots: Option<usize>,
}

/// What one slot looks like on disk
#[derive(Debug, PartialEq, Eq)]
pub struct SlotReport {
    pub slot: SlotId,
    /// State file size and xxh3 checksum, if present
    pub state: Option<(u64, u64)>,
    /// Input log shape, if present
    pub log: Option<LogSummary>,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs, config: &LoopConfig) -> Result<()> {
    let dir = args
        .dir
        .as_deref()
        .unwrap_or(config.store.directory.as_path());
    let slots = args.slots.unwrap_or(config.store.slot_count);
    let record_size = args
        .record_size
        .unwrap_or(std::mem::size_of::<DemoInput>());

    println!("=== Loop Directory ===");
    println!("  Path: {}", dir.display());
    println!("  Record size: {record_size} bytes");
    println!();

    for report in inspect(dir, slots, record_size)? {
        print_report(&report);
    }
    Ok(())
}

/// Collect a report for slots `0..slots` under `dir`
pub fn inspect(dir: &Path, slots: usize, record_size: usize) -> Result<Vec<SlotReport>> {
    if record_size == 0 {
        anyhow::bail!("--record-size must be at least 1");
    }
    if slots > MAX_SLOT_COUNT {
        anyhow::bail!("--slots must be at most {MAX_SLOT_COUNT}");
    }
    (0..slots)
        .map(|index| SlotId(index as u32))
        .map(|slot| {
            Ok::<_, anyhow::Error>(SlotReport {
                slot,
                state: state_info(&state_file_path(dir, slot))?,
                log: log_info(&input_log_path(dir, slot), record_size)?,
            })
        })
        .collect()
}

fn state_info(path: &Path) -> Result<Option<(u64, u64)>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some((bytes.len() as u64, xxhash_rust::xxh3::xxh3_64(&bytes))))
}

fn log_info(path: &Path, record_size: usize) -> Result<Option<LogSummary>> {
    match InputLog::summarize(path, record_size) {
        Ok(summary) => Ok(Some(summary)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to inspect {}", path.display())),
    }
}

fn print_report(report: &SlotReport) {
    println!("Slot {}:", report.slot);
    match report.state {
        Some((size, checksum)) => println!("  State: {size} bytes, xxh3 {checksum:016x}"),
        None => println!("  State: (none)"),
    }
    match &report.log {
        Some(log) if log.is_aligned() => println!("  Inputs: {} records", log.records),
        Some(log) => println!(
            "  Inputs: {} records + {} trailing bytes (misaligned)",
            log.records, log.trailing_bytes
        ),
        None => println!("  Inputs: (none)"),
    }
}
