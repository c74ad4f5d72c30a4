//! Snapshot store: slot lifecycle plus save/restore copies

use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};

use super::MAX_SLOT_COUNT;
use super::slot::{Slot, SlotId};

/// Path of a slot's state file inside `directory`
pub fn state_file_path(directory: &Path, slot: SlotId) -> PathBuf {
    directory.join(format!("slot-{}-state.bin", slot.0))
}

/// Path of a slot's input log inside `directory`
pub fn input_log_path(directory: &Path, slot: SlotId) -> PathBuf {
    directory.join(format!("slot-{}-input.bin", slot.0))
}

/// Fixed set of memory-mapped snapshot slots
///
/// Created once at startup with [`SnapshotStore::initialize`] and torn down
/// with [`SnapshotStore::shutdown`] (or on drop). Every slot's mapping has the
/// same length: the host state length passed at initialization.
pub struct SnapshotStore {
    directory: PathBuf,
    byte_length: usize,
    slots: Vec<Slot>,
}

impl SnapshotStore {
    /// Create and map `slot_count` slots of `byte_length` bytes under `directory`
    ///
    /// Slots that fail any step (create, resize, map) are left invalid and the
    /// rest are still initialized. Check [`valid_count`](Self::valid_count) to
    /// see how many succeeded; partial success is normal.
    pub fn initialize(slot_count: usize, byte_length: usize, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();

        let dir_error = std::fs::create_dir_all(&directory).err().map(|e| {
            let err = Error::io(
                &e,
                ErrorKind::Unknown,
                format!("create {}", directory.display()),
            );
            tracing::warn!(dir = %directory.display(), error = %err, "Snapshot directory unavailable");
            err.kind()
        });

        if slot_count > MAX_SLOT_COUNT {
            tracing::warn!(requested = slot_count, max = MAX_SLOT_COUNT, "Slot count capped");
        }
        let slot_count = slot_count.min(MAX_SLOT_COUNT);

        let slots = (0..slot_count)
            .map(|index| SlotId(index as u32))
            .map(|id| {
                let path = state_file_path(&directory, id);
                match dir_error {
                    Some(kind) => Slot::failed(id, path, kind),
                    None => Slot::create(id, path, byte_length),
                }
            })
            .collect::<Vec<_>>();

        let store = Self {
            directory,
            byte_length,
            slots,
        };
        tracing::info!(
            dir = %store.directory.display(),
            slots = slot_count,
            valid = store.valid_count(),
            byte_length,
            "Snapshot store initialized"
        );
        store
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Host state length every slot was sized to
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently mapped and usable
    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_valid()).count()
    }

    /// Whether `slot` exists and is mapped, open and non-empty
    pub fn is_valid(&self, slot: SlotId) -> bool {
        self.slots.get(slot.index()).is_some_and(Slot::is_valid)
    }

    /// Path of the slot's state file, if the slot exists
    pub fn slot_path(&self, slot: SlotId) -> Option<&Path> {
        self.slots.get(slot.index()).map(Slot::path)
    }

    /// Path of the slot's input log, if the slot exists
    pub fn input_log_path(&self, slot: SlotId) -> Option<PathBuf> {
        self.slots
            .get(slot.index())
            .map(|_| input_log_path(&self.directory, slot))
    }

    /// Most recent failure recorded against `slot`
    pub fn last_error(&self, slot: SlotId) -> Option<ErrorKind> {
        self.slots.get(slot.index()).and_then(Slot::last_error)
    }

    /// Copy `source` into the slot's mapping
    ///
    /// Every precondition is checked before the copy starts, so a rejected
    /// save leaves the previous snapshot untouched.
    pub fn save(&mut self, slot: SlotId, source: &[u8]) -> Result<()> {
        let target = self.checked_slot(slot, source.len())?;
        target.region_mut()?.copy_from_slice(source);
        tracing::trace!(slot = slot.0, bytes = source.len(), "Snapshot saved");
        Ok(())
    }

    /// Copy the slot's mapping into `destination`
    pub fn restore(&mut self, slot: SlotId, destination: &mut [u8]) -> Result<()> {
        let source = self.checked_slot(slot, destination.len())?;
        destination.copy_from_slice(source.region()?);
        tracing::trace!(slot = slot.0, bytes = destination.len(), "Snapshot restored");
        Ok(())
    }

    /// xxHash3 of the slot's current contents
    pub fn checksum(&self, slot: SlotId) -> Result<u64> {
        let target = self
            .slots
            .get(slot.index())
            .filter(|s| s.is_valid())
            .ok_or_else(|| invalid_slot(slot))?;
        Ok(xxhash_rust::xxh3::xxh3_64(target.region()?))
    }

    /// Unmap and close every slot still mapped. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        let released = self
            .slots
            .iter_mut()
            .map(Slot::teardown)
            .filter(|&released| released)
            .count();
        if released > 0 {
            tracing::info!(dir = %self.directory.display(), released, "Snapshot store shut down");
        }
    }

    /// Validate a save/restore request against `slot`, in precondition order
    fn checked_slot(&mut self, slot: SlotId, len: usize) -> Result<&mut Slot> {
        let target = match self.slots.get_mut(slot.index()) {
            Some(target) if target.is_valid() => target,
            _ => return Err(invalid_slot(slot)),
        };
        if len == 0 {
            target.record_error(ErrorKind::HostStateMissing);
            return Err(Error::new(
                ErrorKind::HostStateMissing,
                format!("no host state supplied for slot {slot}"),
            ));
        }
        if len != target.mapped_len() {
            target.record_error(ErrorKind::InvalidArgument);
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "host state is {len} bytes but slot {slot} maps {} bytes",
                    target.mapped_len()
                ),
            ));
        }
        Ok(target)
    }
}

impl Drop for SnapshotStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn invalid_slot(slot: SlotId) -> Error {
    Error::new(
        ErrorKind::SlotInvalid,
        format!("slot {slot} is out of range or not mapped"),
    )
}
