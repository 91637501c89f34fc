//! Signature-based format detection.
//!
//! A [`FormatRegistry`] holds an ordered list of `(format, detector)` pairs.
//! Detection over a buffer or a file path tries detectors in registration
//! order and the first match wins. Both entry points apply the same
//! predicate, so a buffer and a file holding the same bytes always detect
//! the same way.
//!
//! # Example
//!
//! ```rust
//! use resarc::{ArchiveFormat, FormatRegistry};
//!
//! let registry = FormatRegistry::with_builtin();
//! let mut header = b"BZh9".to_vec();
//! header.resize(14, 0);
//! assert_eq!(registry.detect(&header), Some(ArchiveFormat::Bzip2));
//! assert_eq!(registry.detect(b"short"), None);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::Archive;
use crate::entry_type::EntryTypeRegistry;
use crate::format::ArchiveFormat;
use crate::options::ArchiveOptions;
use crate::{ByteBuffer, Error, Result};

/// A signature check over the first `probe_len` bytes of an archive.
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    /// Number of leading bytes the predicate needs.
    pub probe_len: usize,
    /// Returns true if the bytes look like the format.
    pub matches: fn(&[u8]) -> bool,
}

impl Detector {
    /// Creates a detector.
    pub const fn new(probe_len: usize, matches: fn(&[u8]) -> bool) -> Self {
        Self { probe_len, matches }
    }

    /// Applies the predicate to an in-memory buffer.
    pub fn matches(&self, data: &[u8]) -> bool {
        (self.matches)(data)
    }

    /// Applies the predicate to the first `probe_len` bytes of the file at `path`.
    pub fn matches_file(&self, path: &Path) -> bool {
        probe_file(path, self.probe_len, self.matches)
    }
}

/// Reads the first `len` bytes of `path` and applies `matches` to them.
///
/// Fails closed: returns false if the file cannot be opened or is shorter
/// than `len` bytes.
pub fn probe_file(path: &Path, len: usize, matches: fn(&[u8]) -> bool) -> bool {
    match read_header(path, len) {
        Ok(header) => matches(&header),
        Err(e) => {
            log::debug!("Cannot probe '{}': {}", path.display(), e);
            false
        }
    }
}

fn read_header(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut header = vec![0u8; len];
    file.read_exact(&mut header)?;
    Ok(header)
}

/// An ordered set of format detectors.
///
/// Registries are plain values: build one at startup, pass it to whatever
/// needs detection, and build isolated ones in tests.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    detectors: Vec<(ArchiveFormat, Detector)>,
    options: ArchiveOptions,
    types: Arc<EntryTypeRegistry>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Creates a registry with no formats.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            options: ArchiveOptions::default(),
            types: Arc::new(EntryTypeRegistry::builtin()),
        }
    }

    /// Creates a registry with every compiled-in format registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for format in ArchiveFormat::all() {
            registry.register(*format, format.detector());
        }
        registry
    }

    /// Sets the options passed to archives created by [`open`](Self::open).
    pub fn options(mut self, options: ArchiveOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the entry type registry passed to created archives.
    pub fn entry_types(mut self, types: Arc<EntryTypeRegistry>) -> Self {
        self.types = types;
        self
    }

    /// Appends a detector. Earlier registrations take precedence.
    pub fn register(&mut self, format: ArchiveFormat, detector: Detector) {
        self.detectors.push((format, detector));
    }

    /// Removes every registered detector.
    pub fn clear(&mut self) {
        self.detectors.clear();
    }

    /// Returns the number of registered detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Returns true if no detectors are registered.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Returns the registered formats in detection order.
    pub fn formats(&self) -> impl Iterator<Item = ArchiveFormat> + '_ {
        self.detectors.iter().map(|(format, _)| *format)
    }

    /// Detects the format of an in-memory buffer.
    pub fn detect(&self, data: &[u8]) -> Option<ArchiveFormat> {
        self.detectors
            .iter()
            .find(|(_, detector)| detector.matches(data))
            .map(|(format, _)| *format)
    }

    /// Detects the format of the file at `path`.
    ///
    /// The file header is read once. Each detector sees exactly its
    /// `probe_len` bytes, and detectors needing more than the file holds
    /// do not match.
    pub fn detect_path(&self, path: &Path) -> Option<ArchiveFormat> {
        let max_len = self.detectors.iter().map(|(_, d)| d.probe_len).max()?;
        let mut header = Vec::with_capacity(max_len);
        match File::open(path) {
            Ok(file) => {
                if let Err(e) = file.take(max_len as u64).read_to_end(&mut header) {
                    log::debug!("Cannot probe '{}': {}", path.display(), e);
                    return None;
                }
            }
            Err(e) => {
                log::debug!("Cannot probe '{}': {}", path.display(), e);
                return None;
            }
        }

        self.detectors
            .iter()
            .find(|(_, detector)| {
                header.len() >= detector.probe_len && detector.matches(&header[..detector.probe_len])
            })
            .map(|(format, _)| *format)
    }

    /// Detects the format of `data` and opens it.
    ///
    /// `filename` is recorded on the archive before decoding, so single-stream
    /// formats can derive their entry name from it.
    pub fn open(&self, data: &ByteBuffer, filename: Option<&Path>) -> Result<Box<dyn Archive>> {
        let format = self.detect(data.data()).ok_or_else(|| {
            Error::InvalidFormat("no registered format recognizes the data".into())
        })?;
        log::debug!("Detected {} archive", format);

        let mut archive = format.create(self.options.clone(), self.types.clone());
        archive
            .core_mut()
            .set_filename(filename.map(PathBuf::from));
        archive.open(data)?;
        Ok(archive)
    }

    /// Reads the file at `path`, detects its format, and opens it.
    pub fn open_file(&self, path: &Path) -> Result<Box<dyn Archive>> {
        let data = std::fs::read(path).map_err(|e| {
            log::warn!("Failed to read archive '{}': {}", path.display(), e);
            Error::Io(e)
        })?;
        self.open(&ByteBuffer::from(data), Some(path))
    }
}
