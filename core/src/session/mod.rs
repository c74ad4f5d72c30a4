//! Record/replay sessions
//!
//! A session ties one snapshot slot to one input log:
//!
//! - **Recording** snapshots the host state into the slot, then appends one
//!   fixed-size input record per frame.
//! - **Playing** restores the snapshot and feeds the recorded inputs back one
//!   per frame. When the log runs out the snapshot is restored again and
//!   playback starts over, so the host replays the same loop indefinitely.
//!
//! Only one session is active at a time. The log file stays open for the
//! whole session and is closed when the session ends.

mod controller;
mod input_log;
mod types;


pub use controller::Session;
pub use input_log::{InputLog, LogSummary};
pub use types::{Mode, SessionStats};
