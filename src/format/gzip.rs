//! Single-member gzip archives (`.gz`, `.tgz`).

use std::path::Path;
use std::sync::Arc;

use crate::archive::{Archive, ArchiveCore};
use crate::codec::deflate::{GZIP_MAGIC, GzipDecoder};
use crate::entry_type::EntryTypeRegistry;
use crate::format::detect::{Detector, probe_file};
use crate::format::stream::{self, Rewrites};
use crate::format::ArchiveFormat;
use crate::options::ArchiveOptions;
use crate::search::SearchOptions;
use crate::{ByteBuffer, Entry, Error, Result};

/// Smallest valid gzip member: a 10-byte header and an 8-byte trailer.
pub const MIN_SIZE: usize = 18;

const DEFAULT_LEVEL: u32 = 6;

const REWRITES: Rewrites = &[("tgz", Some("tar")), ("gz", None)];

/// A gzip-compressed single payload.
///
/// When the member header stores the original file name, the entry takes
/// that name instead of one derived from the archive file.
#[derive(Debug)]
pub struct GzipArchive {
    core: ArchiveCore,
}

impl Default for GzipArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipArchive {
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
        }
    }

    /// Returns true if `data` is long enough and starts with a deflate gzip header.
    pub fn is_this_format(data: &[u8]) -> bool {
        data.len() >= MIN_SIZE && data.starts_with(GZIP_MAGIC)
    }

    /// Applies [`is_this_format`](Self::is_this_format) to the first bytes of
    /// the file at `path`.
    pub fn is_this_file(path: &Path) -> bool {
        probe_file(path, MIN_SIZE, Self::is_this_format)
    }

    /// Returns the registry detector for this format.
    pub fn detector() -> Detector {
        Detector::new(MIN_SIZE, Self::is_this_format)
    }

    fn stored_name(data: &[u8]) -> Option<String> {
        let name = GzipDecoder::new(data).original_name()?;
        // Only the final component; stored names may carry a directory
        let name = name.rsplit(['/', '\\']).next()?.to_string();
        (!name.is_empty()).then_some(name)
    }
}

impl Archive for GzipArchive {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Gzip
    }

    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn open(&mut self, data: &ByteBuffer) -> Result<()> {
        if !Self::is_this_format(data.data()) {
            log::debug!("Rejecting gzip open: bad header or {} bytes", data.size());
            return Err(Error::InvalidFormat(
                "missing gzip deflate header or data too short".into(),
            ));
        }

        let name = Self::stored_name(data.data())
            .unwrap_or_else(|| stream::entry_name_for(&self.core, REWRITES));
        stream::open_single(&mut self.core, ArchiveFormat::Gzip.codec(), name, data)
    }

    fn write(&mut self, out: &mut ByteBuffer, update: bool) -> Result<()> {
        let level = self.core.options().level.unwrap_or(DEFAULT_LEVEL);
        stream::write_single(&mut self.core, ArchiveFormat::Gzip, level, out, update)
    }

    fn load_entry_data(&mut self, _path: &str) -> Result<()> {
        Err(Error::UnsupportedOperation {
            format: ArchiveFormat::Gzip,
            operation: "lazy entry loading",
        })
    }

    fn find_last(&self, options: &SearchOptions) -> Option<&Entry> {
        self.find_first(options)
    }
}
