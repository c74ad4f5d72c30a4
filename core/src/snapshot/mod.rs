//! Snapshot store
//!
//! A fixed set of numbered slots, each backed by a memory-mapped file sized to
//! exactly the host state length. Saving and restoring a snapshot is a single
//! bounded memory copy into or out of the mapping, so even very large host
//! states round-trip within one frame.
//!
//! # On-disk layout
//!
//! Each slot owns `<dir>/slot-<id>-state.bin`: a flat file of exactly
//! `byte_length` bytes holding a raw copy of the host state. No header, no
//! checksum. The matching input log lives next to it as
//! `<dir>/slot-<id>-input.bin`.

mod slot;
mod store;


pub use slot::SlotId;
pub use store::{SnapshotStore, input_log_path, state_file_path};

/// Default number of slots when none is configured
pub const DEFAULT_SLOT_COUNT: usize = 4;

/// Upper bound on slots per store; larger requests are capped
pub const MAX_SLOT_COUNT: usize = 1024;
