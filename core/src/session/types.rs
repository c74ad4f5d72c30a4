//! Core types for record/replay sessions

use crate::snapshot::SlotId;

use super::input_log::InputLog;

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing recorded or replayed; no log open
    Idle,
    /// Appending input records to the slot's log
    Recording(SlotId),
    /// Replaying the slot's log in a loop from its snapshot
    Playing(SlotId),
}

impl Mode {
    /// Slot the session is bound to, if any
    pub fn active_slot(self) -> Option<SlotId> {
        match self {
            Self::Idle => None,
            Self::Recording(slot) | Self::Playing(slot) => Some(slot),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording(_) => "recording",
            Self::Playing(_) => "playing",
        }
    }
}

/// Counters for the current (or most recent) session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Records appended by the current or last recording
    pub frames_recorded: u64,
    /// Records in the log being replayed
    pub frames_in_loop: u64,
    /// Frames delivered since playback began or last wrapped (1-based)
    pub playback_frame: u64,
    /// Times playback wrapped back to the snapshot
    pub loops_completed: u64,
}

/// Session state that owns its resources
///
/// The log handle lives inside the variant, so leaving a mode always drops
/// (and closes) the log, and Recording and Playing cannot coexist.
#[derive(Debug)]
pub(super) enum Active {
    Idle,
    Recording { slot: SlotId, log: InputLog },
    Playing { slot: SlotId, log: InputLog },
}

impl Active {
    pub(super) fn mode(&self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::Recording { slot, .. } => Mode::Recording(*slot),
            Self::Playing { slot, .. } => Mode::Playing(*slot),
        }
    }

    pub(super) fn log(&self) -> Option<&InputLog> {
        match self {
            Self::Idle => None,
            Self::Recording { log, .. } | Self::Playing { log, .. } => Some(log),
        }
    }
}
