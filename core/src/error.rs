//! Error taxonomy for the loop core
//!
//! Low-level `std::io` failures are classified exactly once, at the file I/O
//! boundary, into an [`ErrorKind`]. Everything above that boundary only ever
//! sees [`Error`], which pairs the kind with a human readable detail string.

use std::fmt;
use std::io;

/// Classification of every failure the loop core can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty path, zero-sized record, length mismatch, closed handle
    InvalidArgument,
    NotFound,
    AccessDenied,
    AlreadyExists,
    IsDirectory,
    DiskFull,
    ReadFailed,
    WriteFailed,
    SeekFailed,
    /// Clean end of stream. Drives the playback loop; never fatal on its own.
    Eof,
    MapFailed,
    SlotInvalid,
    HostStateMissing,
    SaveFailed,
    RestoreFailed,
    Unknown,
}

impl ErrorKind {
    /// Stable lowercase name, used in log fields and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::AlreadyExists => "already_exists",
            Self::IsDirectory => "is_directory",
            Self::DiskFull => "disk_full",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
            Self::SeekFailed => "seek_failed",
            Self::Eof => "eof",
            Self::MapFailed => "map_failed",
            Self::SlotInvalid => "slot_invalid",
            Self::HostStateMissing => "host_state_missing",
            Self::SaveFailed => "save_failed",
            Self::RestoreFailed => "restore_failed",
            Self::Unknown => "unknown",
        }
    }

    /// Classify an I/O error raised by an operation whose generic failure is `fallback`
    ///
    /// Well-known OS conditions (missing file, permissions, full disk...) map to
    /// their own kind regardless of the operation; anything else becomes `fallback`.
    pub fn classify(err: &io::Error, fallback: ErrorKind) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::AccessDenied
            }
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::IsADirectory => Self::IsDirectory,
            io::ErrorKind::StorageFull => Self::DiskFull,
            io::ErrorKind::UnexpectedEof => Self::Eof,
            io::ErrorKind::InvalidInput => Self::InvalidArgument,
            _ => fallback,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible loop-core operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct Error {
    kind: ErrorKind,
    detail: String,
}

impl Error {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Build an error from an I/O failure, classifying it once
    pub(crate) fn io(err: &io::Error, fallback: ErrorKind, context: impl fmt::Display) -> Self {
        Self::new(ErrorKind::classify(err, fallback), format!("{context}: {err}"))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_eof(&self) -> bool {
        self.kind == ErrorKind::Eof
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_maps_os_conditions_before_fallback() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(
            ErrorKind::classify(&not_found, ErrorKind::ReadFailed),
            ErrorKind::NotFound
        );

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            ErrorKind::classify(&denied, ErrorKind::WriteFailed),
            ErrorKind::AccessDenied
        );

        let full = io::Error::from(io::ErrorKind::StorageFull);
        assert_eq!(
            ErrorKind::classify(&full, ErrorKind::WriteFailed),
            ErrorKind::DiskFull
        );

        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert_eq!(ErrorKind::classify(&eof, ErrorKind::ReadFailed), ErrorKind::Eof);
    }

    #[test]
    fn test_classify_falls_back_for_generic_failures() {
        let other = io::Error::other("boom");
        assert_eq!(
            ErrorKind::classify(&other, ErrorKind::SeekFailed),
            ErrorKind::SeekFailed
        );
    }

    #[test]
    fn test_error_display_includes_kind_and_detail() {
        let err = Error::new(ErrorKind::SlotInvalid, "slot 3 is not mapped");
        assert_eq!(err.to_string(), "slot_invalid: slot 3 is not mapped");
        assert_eq!(err.kind(), ErrorKind::SlotInvalid);
        assert!(!err.is_eof());
    }

    #[test]
    fn test_io_constructor_keeps_context() {
        let err = Error::io(
            &io::Error::from(io::ErrorKind::NotFound),
            ErrorKind::ReadFailed,
            "open /tmp/missing",
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.detail().starts_with("open /tmp/missing"));
    }
}
