//! Typed file access for the snapshot store and input log
//!
//! A thin layer over `std::fs::File` that classifies every failure into an
//! [`ErrorKind`] and makes "clean end of stream" a distinct outcome from a
//! short read. Handles close idempotently; any operation on a closed handle is
//! rejected instead of touching a stale descriptor.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};

/// How a file should be opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
    pub append: bool,
}

impl OpenFlags {
    /// Existing file, sequential reads only
    pub const fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            create: false,
            truncate: false,
            append: false,
        }
    }

    /// Read-write, created if missing, emptied if present
    pub const fn create_truncate() -> Self {
        Self {
            read: true,
            write: true,
            create: true,
            truncate: true,
            append: false,
        }
    }

    /// Write-only append, created if missing, existing contents kept
    pub const fn append() -> Self {
        Self {
            read: false,
            write: true,
            create: true,
            truncate: false,
            append: true,
        }
    }

    fn to_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .create(self.create)
            .truncate(self.truncate)
            .append(self.append);
        options
    }
}

/// Result of a successful [`FileHandle::read_exact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The whole buffer was filled
    Full,
    /// The stream ended before a single byte was read
    Eof,
}

/// An open (or explicitly closed) file
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    file: Option<File>,
}

impl FileHandle {
    /// Open `path` with the given flags
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument, "empty path"));
        }
        let file = flags
            .to_options()
            .open(path)
            .map_err(|e| Error::io(&e, ErrorKind::Unknown, format!("open {}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Borrow the underlying file (used to map it)
    pub(crate) fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(|| closed(&self.path))
    }

    /// Fill `buf` completely
    ///
    /// Returns [`ReadOutcome::Eof`] when the stream ends before the first byte.
    /// Running out of data part way through the buffer is a `ReadFailed` error:
    /// the caller asked for a whole record and only got a fragment.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        let Self { path, file } = self;
        let file = file.as_mut().ok_or_else(|| closed(path))?;
        let wanted = buf.len();
        let mut filled = 0;
        while filled < wanted {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::io(
                        &e,
                        ErrorKind::ReadFailed,
                        format!("read {}", path.display()),
                    ));
                }
            }
        }
        match filled {
            n if n == wanted => Ok(ReadOutcome::Full),
            0 => Ok(ReadOutcome::Eof),
            n => Err(Error::new(
                ErrorKind::ReadFailed,
                format!("short read from {}: {n} of {wanted} bytes", path.display()),
            )),
        }
    }

    /// Write all of `buf`, returning the number of bytes written
    pub fn write_exact(&mut self, buf: &[u8]) -> Result<usize> {
        let Self { path, file } = self;
        let file = file.as_mut().ok_or_else(|| closed(path))?;
        file.write_all(buf)
            .map_err(|e| Error::io(&e, ErrorKind::WriteFailed, format!("write {}", path.display())))?;
        Ok(buf.len())
    }

    /// Move the cursor, returning the new offset from the start
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let Self { path, file } = self;
        let file = file.as_mut().ok_or_else(|| closed(path))?;
        file.seek(pos)
            .map_err(|e| Error::io(&e, ErrorKind::SeekFailed, format!("seek {}", path.display())))
    }

    /// Current file length in bytes
    pub fn len(&self) -> Result<u64> {
        let metadata = self.file()?.metadata().map_err(|e| {
            Error::io(&e, ErrorKind::ReadFailed, format!("stat {}", self.path.display()))
        })?;
        Ok(metadata.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Resize the file to exactly `len` bytes
    pub fn set_len(&mut self, len: u64) -> Result<()> {
        self.file()?.set_len(len).map_err(|e| {
            Error::io(&e, ErrorKind::WriteFailed, format!("resize {}", self.path.display()))
        })
    }

    /// Release the descriptor. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.file.take();
        Ok(())
    }
}

fn closed(path: &Path) -> Error {
    Error::new(
        ErrorKind::InvalidArgument,
        format!("{} is closed", path.display()),
    )
}
