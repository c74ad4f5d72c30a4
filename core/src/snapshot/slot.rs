//! A single snapshot slot and its backing mapping

use std::fmt;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::error::{Error, ErrorKind, Result};
use crate::fileio::{FileHandle, OpenFlags};

/// Identifier of a snapshot slot, in `0..slot_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Backing file plus its read-write mapping
///
/// Field order matters: the mapping is dropped before the file it maps.
struct Backing {
    map: MmapMut,
    handle: FileHandle,
}

pub(super) struct Slot {
    id: SlotId,
    path: PathBuf,
    backing: Option<Backing>,
    mapped_len: usize,
    last_error: Option<ErrorKind>,
}

impl Slot {
    /// Create, size and map the slot's backing file
    ///
    /// Never fails outright: a slot whose setup fails comes back invalid with
    /// `last_error` set, so one bad slot cannot take the others down with it.
    pub(super) fn create(id: SlotId, path: PathBuf, byte_length: usize) -> Self {
        match map_backing(&path, byte_length) {
            Ok(backing) => {
                tracing::debug!(slot = id.0, path = %path.display(), byte_length, "Slot mapped");
                Self {
                    id,
                    path,
                    backing: Some(backing),
                    mapped_len: byte_length,
                    last_error: None,
                }
            }
            Err(e) => {
                tracing::warn!(slot = id.0, path = %path.display(), error = %e, "Slot unavailable");
                Self {
                    id,
                    path,
                    backing: None,
                    mapped_len: 0,
                    last_error: Some(e.kind()),
                }
            }
        }
    }

    /// An invalid slot that never got as far as touching the filesystem
    pub(super) fn failed(id: SlotId, path: PathBuf, kind: ErrorKind) -> Self {
        Self {
            id,
            path,
            backing: None,
            mapped_len: 0,
            last_error: Some(kind),
        }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn mapped_len(&self) -> usize {
        self.mapped_len
    }

    pub(super) fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub(super) fn record_error(&mut self, kind: ErrorKind) {
        self.last_error = Some(kind);
    }

    pub(super) fn is_valid(&self) -> bool {
        match &self.backing {
            Some(backing) => backing.handle.is_open() && self.mapped_len > 0,
            None => false,
        }
    }

    pub(super) fn region(&self) -> Result<&[u8]> {
        match &self.backing {
            Some(backing) => Ok(&backing.map[..]),
            None => Err(unmapped(self.id)),
        }
    }

    pub(super) fn region_mut(&mut self) -> Result<&mut [u8]> {
        match self.backing.as_mut() {
            Some(backing) => Ok(&mut backing.map[..]),
            None => Err(unmapped(self.id)),
        }
    }

    /// Unmap and close. Returns whether there was anything to tear down.
    pub(super) fn teardown(&mut self) -> bool {
        let Some(Backing { map, mut handle }) = self.backing.take() else {
            return false;
        };
        drop(map);
        // Closing an owned handle cannot fail
        let _ = handle.close();
        self.mapped_len = 0;
        true
    }
}

fn unmapped(id: SlotId) -> Error {
    Error::new(ErrorKind::SlotInvalid, format!("slot {id} is not mapped"))
}

fn map_backing(path: &Path, byte_length: usize) -> Result<Backing> {
    if byte_length == 0 {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            "snapshot length must be non-zero",
        ));
    }

    let mut handle = FileHandle::open(path, OpenFlags::create_truncate())?;
    handle.set_len(byte_length as u64)?;

    // SAFETY: the file was just created/truncated by us and is owned by this
    // slot for the mapping's whole lifetime. Nothing else in the process
    // resizes it, and external modification of the backing file is outside
    // the contract of the store.
    let map = unsafe {
        MmapOptions::new()
            .len(byte_length)
            .map_mut(handle.file()?)
            .map_err(|e| Error::io(&e, ErrorKind::MapFailed, format!("map {}", path.display())))?
    };

    Ok(Backing { map, handle })
}
