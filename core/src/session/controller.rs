//! Session controller wrapping the snapshot store and input log

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::config::LoopConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::fileio::ReadOutcome;
use crate::snapshot::{SlotId, SnapshotStore};

use super::input_log::InputLog;
use super::types::{Active, Mode, SessionStats};

/// Record/replay controller
///
/// Generic over the input record type `I`, which only has to be plain old
/// data: records are written and read as their raw bytes.
///
/// The host state is passed in on every call that touches it, as a byte
/// slice of the same length the store was initialized with. Borrowing it per
/// call keeps restores strictly between host updates.
pub struct Session<I: Pod> {
    store: SnapshotStore,
    default_slot: SlotId,
    active: Active,
    stats: SessionStats,
    _input: PhantomData<fn() -> I>,
}

impl<I: Pod> Session<I> {
    /// Size in bytes of one input record
    pub const RECORD_SIZE: usize = std::mem::size_of::<I>();

    /// Create an idle session over an initialized store
    ///
    /// `default_slot` is the slot [`toggle`](Self::toggle) records into.
    pub fn new(store: SnapshotStore, default_slot: SlotId) -> Result<Self> {
        if Self::RECORD_SIZE == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "input record type must not be zero-sized",
            ));
        }
        Ok(Self {
            store,
            default_slot,
            active: Active::Idle,
            stats: SessionStats::default(),
            _input: PhantomData,
        })
    }

    /// Initialize a store from `config` for a host state of `byte_length` bytes
    pub fn from_config(config: &LoopConfig, byte_length: usize) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::new(ErrorKind::InvalidArgument, e.to_string()))?;
        let store = SnapshotStore::initialize(
            config.store.slot_count,
            byte_length,
            config.store.directory.clone(),
        );
        Self::new(store, SlotId(config.session.default_slot))
    }

    pub fn mode(&self) -> Mode {
        self.active.mode()
    }

    pub fn active_slot(&self) -> Option<SlotId> {
        self.mode().active_slot()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.active, Active::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.active, Active::Recording { .. })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.active, Active::Playing { .. })
    }

    pub fn default_slot(&self) -> SlotId {
        self.default_slot
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// The open input log, if a session is active
    pub fn input_log(&self) -> Option<&InputLog> {
        self.active.log()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Snapshot `host` into `slot` and start logging inputs
    ///
    /// Only legal from idle. On failure nothing changes.
    pub fn begin_recording(&mut self, slot: SlotId, host: &[u8]) -> Result<()> {
        self.check_can_begin(slot, host.len())?;
        let path = self.log_path(slot)?;

        let log = InputLog::create(&path, Self::RECORD_SIZE)?;
        // The baseline must exist before the first record is written
        self.store.save(slot, host).map_err(|e| {
            Error::new(
                ErrorKind::SaveFailed,
                format!("baseline snapshot for slot {slot}: {e}"),
            )
        })?;

        tracing::info!(slot = slot.0, log = %path.display(), "Recording started");
        self.active = Active::Recording { slot, log };
        self.stats = SessionStats::default();
        Ok(())
    }

    /// Append one input record. Returns `Ok(false)` when not recording.
    ///
    /// A failed write ends the session, so a recording never continues past
    /// a record that did not reach the log.
    pub fn record_frame(&mut self, input: &I) -> Result<bool> {
        let Active::Recording { log, .. } = &mut self.active else {
            return Ok(false);
        };
        match log.append(bytemuck::bytes_of(input)) {
            Ok(()) => {
                self.stats.frames_recorded += 1;
                Ok(true)
            }
            Err(e) => {
                self.abort("Recording", &e);
                Err(e)
            }
        }
    }

    /// Stop recording. No-op unless recording.
    pub fn end_recording(&mut self) {
        if !self.is_recording() {
            return;
        }
        if let Some((slot, records)) = self.close_active() {
            tracing::info!(slot = slot.0, frames = records, "Recording finished");
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Restore `slot`'s snapshot into `host` and start replaying its log
    ///
    /// Only legal from idle. On failure the session stays idle; `host` is
    /// only overwritten once the log has been opened and validated.
    pub fn begin_playback(&mut self, slot: SlotId, host: &mut [u8]) -> Result<()> {
        self.check_can_begin(slot, host.len())?;
        let path = self.log_path(slot)?;

        let log = InputLog::open(&path, Self::RECORD_SIZE)?;
        self.store.restore(slot, host).map_err(|e| {
            Error::new(
                ErrorKind::RestoreFailed,
                format!("baseline restore for slot {slot}: {e}"),
            )
        })?;

        tracing::info!(slot = slot.0, frames = log.records(), "Playback started");
        self.stats = SessionStats {
            frames_recorded: self.stats.frames_recorded,
            frames_in_loop: log.records(),
            playback_frame: 0,
            loops_completed: 0,
        };
        self.active = Active::Playing { slot, log };
        Ok(())
    }

    /// Read the next input record into `out`. Returns `Ok(false)` when not playing.
    ///
    /// At the end of the log the snapshot is restored into `host`, the log is
    /// rewound and its first record is delivered, all within this call: while
    /// playing, every tick yields a frame. Any other failure, including a
    /// record cut short, ends the session.
    pub fn playback_frame(&mut self, host: &mut [u8], out: &mut I) -> Result<bool> {
        let Self {
            store,
            active,
            stats,
            ..
        } = self;
        let Active::Playing { slot, log } = active else {
            return Ok(false);
        };

        let result = match log.read_next(bytemuck::bytes_of_mut(out)) {
            Ok(ReadOutcome::Full) => Ok(()),
            Ok(ReadOutcome::Eof) => loop_to_start(store, *slot, log, host, out).map(|()| {
                stats.loops_completed += 1;
                stats.playback_frame = 0;
                tracing::debug!(slot = slot.0, loops = stats.loops_completed, "Playback looped");
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.stats.playback_frame += 1;
                Ok(true)
            }
            Err(e) => {
                self.abort("Playback", &e);
                Err(e)
            }
        }
    }

    /// Stop playback. No-op unless playing.
    pub fn end_playback(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some((slot, _)) = self.close_active() {
            tracing::info!(
                slot = slot.0,
                loops = self.stats.loops_completed,
                "Playback finished"
            );
        }
    }

    // ========================================================================
    // Compound transitions
    // ========================================================================

    /// Advance the Idle → Recording → Playing → Idle cycle by one step
    ///
    /// From recording, playback starts on the slot just recorded. Returns the
    /// resulting mode.
    pub fn toggle(&mut self, host: &mut [u8]) -> Result<Mode> {
        match self.mode() {
            Mode::Playing(_) => self.end_playback(),
            Mode::Recording(slot) => {
                self.end_recording();
                self.begin_playback(slot, host)?;
            }
            Mode::Idle => self.begin_recording(self.default_slot, host)?,
        }
        Ok(self.mode())
    }

    /// End whatever session is active
    pub fn stop(&mut self) {
        self.end_recording();
        self.end_playback();
    }

    /// Stop and release every slot. Later `begin_*` calls fail.
    pub fn shutdown(&mut self) {
        self.stop();
        self.store.shutdown();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_can_begin(&self, slot: SlotId, host_len: usize) -> Result<()> {
        if let Some(active) = self.active_slot() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("session busy: {} slot {active}", self.mode().as_str()),
            ));
        }
        if host_len == 0 {
            return Err(Error::new(
                ErrorKind::HostStateMissing,
                "no host state supplied",
            ));
        }
        if !self.store.is_valid(slot) {
            return Err(Error::new(
                ErrorKind::SlotInvalid,
                format!("slot {slot} is out of range or not mapped"),
            ));
        }
        if host_len != self.store.byte_length() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "host state is {host_len} bytes, store slots are {}",
                    self.store.byte_length()
                ),
            ));
        }
        Ok(())
    }

    fn log_path(&self, slot: SlotId) -> Result<std::path::PathBuf> {
        self.store.input_log_path(slot).ok_or_else(|| {
            Error::new(
                ErrorKind::SlotInvalid,
                format!("slot {slot} is out of range"),
            )
        })
    }

    /// Return to idle, closing the log. Yields the slot and record count.
    fn close_active(&mut self) -> Option<(SlotId, u64)> {
        match std::mem::replace(&mut self.active, Active::Idle) {
            Active::Idle => None,
            Active::Recording { slot, mut log } | Active::Playing { slot, mut log } => {
                let records = log.records();
                let _ = log.close();
                Some((slot, records))
            }
        }
    }

    fn abort(&mut self, what: &str, err: &Error) {
        if let Some((slot, _)) = self.close_active() {
            tracing::warn!(slot = slot.0, error = %err, "{what} aborted");
        }
    }
}

impl<I: Pod> Drop for Session<I> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wrap playback around: restore the baseline and deliver the first record again
fn loop_to_start<I: Pod>(
    store: &mut SnapshotStore,
    slot: SlotId,
    log: &mut InputLog,
    host: &mut [u8],
    out: &mut I,
) -> Result<()> {
    store.restore(slot, host).map_err(|e| {
        Error::new(
            ErrorKind::RestoreFailed,
            format!("loop restore for slot {slot}: {e}"),
        )
    })?;
    log.rewind()?;
    match log.read_next(bytemuck::bytes_of_mut(out))? {
        ReadOutcome::Full => Ok(()),
        ReadOutcome::Eof => Err(Error::new(
            ErrorKind::ReadFailed,
            format!("{} emptied during playback", log.path().display()),
        )),
    }
}
