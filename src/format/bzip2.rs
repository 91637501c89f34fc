//! Single-stream bzip2 archives (`.bz2`, `.tbz`, `.tb2`, `.tbz2`).
//!
//! A bzip2 archive holds exactly one entry: the decompressed payload, named
//! after the archive file with its compression extension rewritten.
//!
//! # Example
//!
//! ```rust
//! use resarc::{Archive, Bzip2Archive, ByteBuffer, Entry};
//!
//! let mut archive = Bzip2Archive::new();
//! archive.core_mut().add_entry("", Entry::with_data("level", b"HELLO"))?;
//!
//! let mut packed = ByteBuffer::new();
//! archive.write(&mut packed, true)?;
//! assert!(Bzip2Archive::is_this_format(packed.data()));
//!
//! let mut reopened = Bzip2Archive::new();
//! reopened.open(&packed)?;
//! assert_eq!(reopened.core().entry("unnamed").unwrap().data(), b"HELLO");
//! # Ok::<(), resarc::Error>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::archive::{Archive, ArchiveCore};
use crate::codec::bzip2::block_size;
use crate::entry_type::EntryTypeRegistry;
use crate::format::detect::{Detector, probe_file};
use crate::format::stream::{self, Rewrites};
use crate::format::ArchiveFormat;
use crate::options::ArchiveOptions;
use crate::search::SearchOptions;
use crate::{ByteBuffer, Entry, Error, Result};

/// Smallest buffer worth probing: the 4-byte stream header, the 6-byte
/// block magic, and the 4-byte block CRC.
pub const MIN_SIZE: usize = 14;

/// Block size digit used when writing an archive that was never opened.
const DEFAULT_BLOCK_SIZE: u32 = 9;

const REWRITES: Rewrites = &[
    ("tbz", Some("tar")),
    ("tb2", Some("tar")),
    ("tbz2", Some("tar")),
    ("bz2", None),
];

/// A bzip2-compressed single payload.
#[derive(Debug)]
pub struct Bzip2Archive {
    core: ArchiveCore,
    block_size: u32,
}

impl Default for Bzip2Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Bzip2Archive {
    /// Creates an empty archive with default options and the built-in entry types.
    pub fn new() -> Self {
        Self::with_options(
            ArchiveOptions::default(),
            Arc::new(EntryTypeRegistry::builtin()),
        )
    }

    /// Creates an empty archive.
    pub fn with_options(options: ArchiveOptions, types: Arc<EntryTypeRegistry>) -> Self {
        Self {
            core: ArchiveCore::new(options, types),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Returns true if `data` is long enough and starts with a valid
    /// `BZh1`..`BZh9` stream header.
    pub fn is_this_format(data: &[u8]) -> bool {
        data.len() >= MIN_SIZE && block_size(data).is_some()
    }

    /// Applies [`is_this_format`](Self::is_this_format) to the first bytes of
    /// the file at `path`.
    ///
    /// Returns false if the file cannot be opened or is too short.
    pub fn is_this_file(path: &Path) -> bool {
        probe_file(path, MIN_SIZE, Self::is_this_format)
    }

    /// Returns the registry detector for this format.
    pub fn detector() -> Detector {
        Detector::new(MIN_SIZE, Self::is_this_format)
    }

    /// Returns the block size digit (1-9) of the last opened stream.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl Archive for Bzip2Archive {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Bzip2
    }

    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn open(&mut self, data: &ByteBuffer) -> Result<()> {
        if data.size() < MIN_SIZE {
            log::debug!(
                "Rejecting bzip2 open: {} bytes is below the {} byte minimum",
                data.size(),
                MIN_SIZE
            );
            return Err(Error::InvalidFormat(format!(
                "bzip2 data too short: {} bytes",
                data.size()
            )));
        }

        let Some(block_size) = block_size(data.data()) else {
            log::debug!("Rejecting bzip2 open: bad stream header");
            return Err(Error::InvalidFormat(
                "missing BZh signature or block size out of range".into(),
            ));
        };

        let name = stream::entry_name_for(&self.core, REWRITES);
        stream::open_single(&mut self.core, ArchiveFormat::Bzip2.codec(), name, data)?;
        self.block_size = block_size;
        Ok(())
    }

    fn write(&mut self, out: &mut ByteBuffer, update: bool) -> Result<()> {
        let level = self.core.options().level.unwrap_or(self.block_size);
        stream::write_single(&mut self.core, ArchiveFormat::Bzip2, level, out, update)
    }

    /// Always fails: the payload is fully decoded when the archive opens, so
    /// there is nothing to load lazily.
    fn load_entry_data(&mut self, _path: &str) -> Result<()> {
        Err(Error::UnsupportedOperation {
            format: ArchiveFormat::Bzip2,
            operation: "lazy entry loading",
        })
    }

    /// Same as [`find_first`](Archive::find_first); the archive holds at most
    /// one entry.
    fn find_last(&self, options: &SearchOptions) -> Option<&Entry> {
        self.find_first(options)
    }
}
