//! Relive Core - instant record and replay of a host's state
//!
//! This crate captures a host program's state into a memory-mapped snapshot
//! slot, records the inputs that follow, and replays them in a loop from the
//! snapshot.
//!
//! # Architecture
//!
//! - [`SnapshotStore`] - Fixed set of memory-mapped slots, one state file each
//! - [`Session`] - Record/playback controller pairing a slot with an input log
//! - [`InputLog`] - Append-only file of fixed-size input records
//! - [`fileio`] - Typed file access that classifies every failure
//! - [`LoopConfig`] - TOML configuration for the store and session

pub mod config;
pub mod error;
pub mod fileio;
#[cfg(test)]
mod integration;
pub mod session;
pub mod snapshot;

pub use config::{ConfigError, LoopConfig, SessionConfig, StoreConfig};
pub use error::{Error, ErrorKind, Result};
pub use session::{InputLog, LogSummary, Mode, Session, SessionStats};
pub use snapshot::{
    DEFAULT_SLOT_COUNT, MAX_SLOT_COUNT, SlotId, SnapshotStore, input_log_path, state_file_path,
};
