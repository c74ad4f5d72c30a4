//! Append-only log of fixed-size input records
//!
//! The log is a flat run of records with no framing: record `n` starts at
//! byte `n * record_size`. Consumers must know the record size out of band.

use std::io::SeekFrom;
use std::path::Path;

use crate::error::{Error, ErrorKind, Result};
use crate::fileio::{FileHandle, OpenFlags, ReadOutcome};

/// Shape of a log file on disk, as seen by [`InputLog::summarize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSummary {
    /// Whole records in the file
    pub records: u64,
    /// Bytes past the last whole record (non-zero means a torn write)
    pub trailing_bytes: u64,
}

impl LogSummary {
    pub fn is_aligned(&self) -> bool {
        self.trailing_bytes == 0
    }
}

/// An open input log, either being written or being replayed
#[derive(Debug)]
pub struct InputLog {
    handle: FileHandle,
    record_size: usize,
    records: u64,
}

impl InputLog {
    /// Create (or empty) the log at `path` for recording
    pub fn create(path: &Path, record_size: usize) -> Result<Self> {
        check_record_size(record_size)?;
        let handle = FileHandle::open(path, OpenFlags::create_truncate())?;
        Ok(Self {
            handle,
            record_size,
            records: 0,
        })
    }

    /// Open an existing log for sequential replay from the first record
    ///
    /// Rejects logs that hold no records or whose length is not a whole
    /// number of records: replaying either would break the loop guarantee.
    pub fn open(path: &Path, record_size: usize) -> Result<Self> {
        check_record_size(record_size)?;
        let handle = FileHandle::open(path, OpenFlags::read_only())?;
        let summary = summarize_len(handle.len()?, record_size);
        if !summary.is_aligned() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "{} has {} trailing bytes after {} records of {record_size} bytes",
                    path.display(),
                    summary.trailing_bytes,
                    summary.records
                ),
            ));
        }
        if summary.records == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("{} holds no records", path.display()),
            ));
        }
        Ok(Self {
            handle,
            record_size,
            records: summary.records,
        })
    }

    /// Inspect a log file without opening it for replay
    pub fn summarize(path: &Path, record_size: usize) -> Result<LogSummary> {
        check_record_size(record_size)?;
        let handle = FileHandle::open(path, OpenFlags::read_only())?;
        Ok(summarize_len(handle.len()?, record_size))
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Records written so far, or records available for replay
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Append one record
    ///
    /// On a failed write the file is cut back to the last whole record so the
    /// log never ends in a fragment.
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        if record.len() != self.record_size {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "record is {} bytes, log expects {}",
                    record.len(),
                    self.record_size
                ),
            ));
        }
        if let Err(e) = self.handle.write_exact(record) {
            let boundary = self.records * self.record_size as u64;
            if self.handle.set_len(boundary).is_ok() {
                let _ = self.handle.seek(SeekFrom::Start(boundary));
            }
            return Err(e);
        }
        self.records += 1;
        Ok(())
    }

    /// Read the next record into `out`
    pub fn read_next(&mut self, out: &mut [u8]) -> Result<ReadOutcome> {
        if out.len() != self.record_size {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "buffer is {} bytes, log records are {}",
                    out.len(),
                    self.record_size
                ),
            ));
        }
        self.handle.read_exact(out)
    }

    /// Move back to the first record
    pub fn rewind(&mut self) -> Result<()> {
        self.handle.seek(SeekFrom::Start(0)).map(|_| ())
    }

    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

fn check_record_size(record_size: usize) -> Result<()> {
    if record_size == 0 {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            "input records must be at least one byte",
        ));
    }
    Ok(())
}

fn summarize_len(len: u64, record_size: usize) -> LogSummary {
    let size = record_size as u64;
    LogSummary {
        records: len / size,
        trailing_bytes: len % size,
    }
}
