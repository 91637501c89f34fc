//! Shared plumbing for single-stream formats.
//!
//! A single-stream archive wraps exactly one payload in a compressed
//! envelope. Opening decodes the whole buffer into one entry named after the
//! archive file; writing encodes that one entry back.

use std::path::Path;

use crate::archive::{ArchiveCore, ArchiveEvent, Directory};
use crate::codec::{self, Codec};
use crate::format::ArchiveFormat;
use crate::{ByteBuffer, Entry, EntryState, Error, Result};

/// Entry name used when the archive has no backing file.
pub(crate) const UNNAMED: &str = "unnamed";

/// Extension rewrites: `(from, Some(to))` replaces, `(from, None)` strips.
pub(crate) type Rewrites = &'static [(&'static str, Option<&'static str>)];

/// Derives the payload's entry name from the archive's file name.
///
/// Extensions are compared case-insensitively. Extensions not in `rewrites`
/// are left unchanged.
pub(crate) fn derive_entry_name(file_name: &str, rewrites: Rewrites) -> String {
    let path = Path::new(file_name);
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return file_name.to_string();
    };

    let rewrite = rewrites
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(ext));
    match rewrite {
        Some((_, Some(to))) => path.with_extension(to).to_string_lossy().into_owned(),
        Some((_, None)) => path.with_extension("").to_string_lossy().into_owned(),
        None => file_name.to_string(),
    }
}

/// Returns the entry name for the archive currently backed by `core`.
pub(crate) fn entry_name_for(core: &ArchiveCore, rewrites: Rewrites) -> String {
    core.file_name()
        .map(|name| derive_entry_name(name, rewrites))
        .unwrap_or_else(|| UNNAMED.to_string())
}

/// Decodes `data` into a single entry named `name` and installs it.
///
/// All-or-nothing: if decoding fails, the tree, the muted flag, and the
/// modified flag are exactly as they were before the call.
pub(crate) fn open_single(
    core: &mut ArchiveCore,
    codec: Codec,
    name: String,
    data: &ByteBuffer,
) -> Result<()> {
    let was_muted = core.is_muted();
    core.set_muted(true);

    let decoded = match codec::decompress(codec, data.data(), &core.options().limits) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!("Failed to decode {} stream '{}': {}", codec, name, e);
            core.set_muted(was_muted);
            return Err(e);
        }
    };

    let mut entry = Entry::new(name, decoded.len() as u64);
    entry.import_buffer(ByteBuffer::from(decoded));
    core.types().detect(&mut entry);
    entry.set_state(EntryState::Unmodified);

    let mut root = Directory::root();
    root.add_entry(entry);
    core.replace_root(root);

    core.set_muted(false);
    core.set_modified(false);
    core.announce(ArchiveEvent::Opened);
    Ok(())
}

/// Encodes the single entry held by `core` into `out`.
///
/// Fails with [`Error::EntryCount`] unless the tree holds exactly one entry.
/// `out` is only replaced once encoding has succeeded.
pub(crate) fn write_single(
    core: &mut ArchiveCore,
    format: ArchiveFormat,
    level: u32,
    out: &mut ByteBuffer,
    update: bool,
) -> Result<()> {
    let count = core.num_entries();
    if count != 1 {
        return Err(Error::EntryCount {
            format,
            expected: 1,
            actual: count,
        });
    }

    let entry = core
        .root_mut()
        .first_entry_mut()
        .ok_or_else(|| Error::EntryCount {
            format,
            expected: 1,
            actual: 0,
        })?;
    let packed = codec::compress(format.codec(), entry.data(), level)?;
    out.replace(packed);

    if update {
        entry.set_state(EntryState::Unmodified);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REWRITES: Rewrites = &[("tbz", Some("tar")), ("bz2", None)];

    #[test]
    fn test_derive_entry_name() {
        assert_eq!(derive_entry_name("foo.tbz", REWRITES), "foo.tar");
        assert_eq!(derive_entry_name("FOO.TBZ", REWRITES), "FOO.tar");
        assert_eq!(derive_entry_name("foo.bz2", REWRITES), "foo");
        assert_eq!(derive_entry_name("foo.xyz", REWRITES), "foo.xyz");
        assert_eq!(derive_entry_name("foo", REWRITES), "foo");
        assert_eq!(derive_entry_name("archive.tar.bz2", REWRITES), "archive.tar");
    }

    #[test]
    fn test_entry_name_without_file() {
        let core = ArchiveCore::default();
        assert_eq!(entry_name_for(&core, REWRITES), UNNAMED);
    }

    #[test]
    fn test_failed_open_restores_muted() {
        let mut core = ArchiveCore::default();
        core.set_muted(true);
        let bad = ByteBuffer::from(&b"BZh5\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff"[..]);
        assert!(open_single(&mut core, Codec::Bzip2, "x".into(), &bad).is_err());
        assert!(core.is_muted());
        assert_eq!(core.num_entries(), 0);
    }

    #[test]
    fn test_write_requires_one_entry() {
        let mut core = ArchiveCore::default();
        let mut out = ByteBuffer::from(&b"keep"[..]);
        let err = write_single(&mut core, ArchiveFormat::Bzip2, 9, &mut out, true).unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(out.data(), b"keep");
    }
}
