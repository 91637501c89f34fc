//! Error types for archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening, querying, or writing archives, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Categories
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|---------------|
//! | Format mismatch | [`InvalidFormat`][Error::InvalidFormat] | Short input, wrong signature |
//! | Codec failure | [`Codec`][Error::Codec] | Corrupt or truncated compressed payload |
//! | Invariant violation | [`EntryCount`][Error::EntryCount] | Writing a tree the format cannot represent |
//! | Backing I/O | [`Io`][Error::Io] | Missing or unreadable archive file |
//! | Resources | [`ResourceLimitExceeded`][Error::ResourceLimitExceeded] | Decompression bombs |
//!
//! Every failure is returned as a value. The registry trying candidate
//! formats, or an editing session reporting to the user, decides what
//! happens next:
//!
//! ```rust
//! use resarc::{Archive, Bzip2Archive, ByteBuffer, Error};
//!
//! let mut archive = Bzip2Archive::new();
//! match archive.open(&ByteBuffer::from(&b"not an archive at all"[..])) {
//!     Ok(()) => println!("opened"),
//!     Err(e) if e.is_format_mismatch() => println!("not bzip2, try the next format"),
//!     Err(e) => println!("open failed: {}", e),
//! }
//! ```

use std::io;

use crate::codec::Codec;
use crate::format::ArchiveFormat;

/// The main error type for archive operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing backing storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data is not in the expected format.
    ///
    /// Returned when the input is shorter than the format's minimum header
    /// size or when its signature does not match.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A compression codec failed to encode or decode a payload.
    #[error("{codec} codec failure: {reason}")]
    Codec {
        /// The codec that failed.
        codec: Codec,
        /// A description of the failure.
        reason: String,
    },

    /// The archive holds a number of entries its format cannot represent.
    ///
    /// Single-stream formats wrap exactly one payload, so writing an empty
    /// archive or one with several entries fails with this error.
    #[error("{format} archive must hold exactly {expected} entry, found {actual}")]
    EntryCount {
        /// The format being written.
        format: ArchiveFormat,
        /// The number of entries the format requires.
        expected: usize,
        /// The number of entries actually present.
        actual: usize,
    },

    /// The requested entry does not exist in the archive.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An entry with the given path already exists.
    #[error("Entry already exists: {path}")]
    EntryExists {
        /// The conflicting path.
        path: String,
    },

    /// The format does not support the requested operation.
    #[error("{format} archives do not support {operation}")]
    UnsupportedOperation {
        /// The format that rejected the operation.
        format: ArchiveFormat,
        /// The name of the operation.
        operation: &'static str,
    },

    /// A configured resource limit was exceeded.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the input was rejected by a size or signature check.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::InvalidFormat(_))
    }

    /// Returns true if a codec failed or a decompression limit tripped.
    pub fn is_codec_failure(&self) -> bool {
        matches!(self, Error::Codec { .. } | Error::ResourceLimitExceeded(_))
    }

    /// Returns true if the archive's entry tree violated a format invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Error::EntryCount { .. })
    }

    /// Builds a codec error from an I/O error raised inside a codec stream.
    ///
    /// Limit violations raised by [`LimitedReader`](crate::safety::LimitedReader)
    /// are tunneled through `io::Error`; they are unwrapped back into
    /// [`Error::ResourceLimitExceeded`] here.
    pub(crate) fn from_codec_io(codec: Codec, e: io::Error) -> Self {
        if let Some(Error::ResourceLimitExceeded(msg)) =
            e.get_ref().and_then(|inner| inner.downcast_ref::<Error>())
        {
            return Error::ResourceLimitExceeded(msg.clone());
        }
        Error::Codec {
            codec,
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidFormat("missing BZh signature".into());
        assert_eq!(err.to_string(), "Invalid format: missing BZh signature");

        let err = Error::EntryCount {
            format: ArchiveFormat::Bzip2,
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "bzip2 archive must hold exactly 1 entry, found 2"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidFormat(String::new()).is_format_mismatch());
        assert!(
            Error::Codec {
                codec: Codec::Bzip2,
                reason: "bad block".into(),
            }
            .is_codec_failure()
        );
        assert!(Error::ResourceLimitExceeded(String::new()).is_codec_failure());
        assert!(
            Error::EntryCount {
                format: ArchiveFormat::Bzip2,
                expected: 1,
                actual: 0,
            }
            .is_invariant_violation()
        );
        assert!(!Error::Io(io::Error::other("x")).is_format_mismatch());
    }

    #[test]
    fn test_from_codec_io_unwraps_limit() {
        let inner = Error::ResourceLimitExceeded("too big".into());
        let err = Error::from_codec_io(Codec::Bzip2, io::Error::other(inner));
        assert!(matches!(err, Error::ResourceLimitExceeded(msg) if msg == "too big"));

        let err = Error::from_codec_io(
            Codec::Bzip2,
            io::Error::new(io::ErrorKind::InvalidData, "corrupt"),
        );
        assert!(matches!(err, Error::Codec { codec: Codec::Bzip2, .. }));
    }
}
