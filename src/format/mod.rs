//! Archive format plugins and format detection.
//!
//! Each format is a typed [`ArchiveFormat`] identity paired with a
//! signature [`Detector`] and a constructor for its [`Archive`]
//! implementation. [`FormatRegistry`] maps raw bytes or a file path to a
//! format in registration order.

pub mod bzip2;
pub mod detect;
#[cfg(feature = "deflate")]
pub mod gzip;
pub(crate) mod stream;

use std::sync::Arc;

pub use bzip2::Bzip2Archive;
pub use detect::{Detector, FormatRegistry};
#[cfg(feature = "deflate")]
pub use gzip::GzipArchive;

use crate::archive::Archive;
use crate::codec::Codec;
use crate::entry_type::EntryTypeRegistry;
use crate::options::ArchiveOptions;

#[cfg(feature = "deflate")]
const ALL_FORMATS: &[ArchiveFormat] = &[ArchiveFormat::Bzip2, ArchiveFormat::Gzip];
#[cfg(not(feature = "deflate"))]
const ALL_FORMATS: &[ArchiveFormat] = &[ArchiveFormat::Bzip2];

/// A supported archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ArchiveFormat {
    /// A single bzip2 stream.
    Bzip2,
    /// A single gzip member (requires the `deflate` feature).
    #[cfg(feature = "deflate")]
    Gzip,
}

impl ArchiveFormat {
    /// Returns every format compiled into this build, in detection order.
    pub fn all() -> &'static [ArchiveFormat] {
        ALL_FORMATS
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveFormat::Bzip2 => "bzip2",
            #[cfg(feature = "deflate")]
            ArchiveFormat::Gzip => "gzip",
        }
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Bzip2 => "bz2",
            #[cfg(feature = "deflate")]
            ArchiveFormat::Gzip => "gz",
        }
    }

    /// Returns the codec wrapping this format's payload.
    pub fn codec(&self) -> Codec {
        match self {
            ArchiveFormat::Bzip2 => Codec::Bzip2,
            #[cfg(feature = "deflate")]
            ArchiveFormat::Gzip => Codec::Gzip,
        }
    }

    /// Returns the signature check for this format.
    pub fn detector(&self) -> Detector {
        match self {
            ArchiveFormat::Bzip2 => Bzip2Archive::detector(),
            #[cfg(feature = "deflate")]
            ArchiveFormat::Gzip => GzipArchive::detector(),
        }
    }

    /// Creates an empty archive of this format.
    pub fn create(
        &self,
        options: ArchiveOptions,
        types: Arc<EntryTypeRegistry>,
    ) -> Box<dyn Archive> {
        match self {
            ArchiveFormat::Bzip2 => Box::new(Bzip2Archive::with_options(options, types)),
            #[cfg(feature = "deflate")]
            ArchiveFormat::Gzip => Box::new(GzipArchive::with_options(options, types)),
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
