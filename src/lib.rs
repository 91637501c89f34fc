//! # resarc
//!
//! A uniform way to open, inspect, query, and re-serialize the archive
//! formats found in game resource packs.
//!
//! Every format decodes into the same tree of named, sized [`Entry`] values,
//! and every format is driven through the same [`Archive`] trait. Formats
//! are recognized by signature through a [`FormatRegistry`], and payload
//! compression goes through one codec seam in [`codec`].
//!
//! ## Quick Start
//!
//! ### Opening an Archive
//!
//! ```rust,no_run
//! use resarc::{FormatRegistry, Result, SearchOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let registry = FormatRegistry::with_builtin();
//!     let archive = registry.open_file(Path::new("level.bz2"))?;
//!
//!     for entry in archive.find_all(&SearchOptions::new()) {
//!         println!("{}: {} bytes", entry.name(), entry.size());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Writing an Archive
//!
//! ```rust
//! use resarc::{Archive, Bzip2Archive, ByteBuffer, Entry, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Bzip2Archive::new();
//!     archive.core_mut().add_entry("", Entry::with_data("MAPINFO", b"map MAP01"))?;
//!
//!     let mut out = ByteBuffer::new();
//!     archive.write(&mut out, true)?;
//!     assert!(Bzip2Archive::is_this_format(out.data()));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | gzip and zlib codecs, and the gzip archive format |
//!
//! ## Safety
//!
//! Decoding enforces [`ResourceLimits`] on every payload, so a small
//! malicious archive cannot expand into unbounded memory. Corrupt input is
//! always reported as an [`Error`] and never leaves an archive half-opened.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod archive;
pub mod buffer;
pub mod codec;
pub mod entry;
pub mod entry_type;
pub mod error;
pub mod format;
pub mod options;
pub mod safety;
pub mod search;

pub use archive::{Archive, ArchiveCore, ArchiveEvent, ArchiveObserver, Directory};
pub use buffer::ByteBuffer;
pub use codec::Codec;
pub use entry::{Entry, EntryState};
pub use entry_type::{EntryType, EntryTypeRegistry};
pub use error::{Error, Result};
pub use format::{ArchiveFormat, Bzip2Archive, Detector, FormatRegistry};
#[cfg(feature = "deflate")]
pub use format::GzipArchive;
pub use options::{ArchiveOptions, ResourceLimits};
pub use safety::LimitedReader;
pub use search::SearchOptions;
