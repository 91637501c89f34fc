//! End-to-end tests for the bzip2 archive format.

mod common;

use std::path::Path;

use common::{archive_named, bzip2_buffer, bzip2_bytes, open_named, record_events};
use resarc::{
    Archive, ArchiveEvent, Bzip2Archive, ByteBuffer, Entry, EntryState, EntryType,
    EntryTypeRegistry, Error, FormatRegistry, SearchOptions,
};

// =============================================================================
// Open
// =============================================================================

#[test]
fn test_open_hello_named_after_file() {
    let mut archive = archive_named("level.bz2");
    let mut data = b"BZh9".to_vec();
    data.extend_from_slice(&bzip2_bytes(9, b"HELLO")[4..]);

    archive.open(&ByteBuffer::from(data)).unwrap();

    assert_eq!(archive.num_entries(), 1);
    let entry = archive.find_first(&SearchOptions::new()).unwrap();
    assert_eq!(entry.name(), "level");
    assert_eq!(entry.data(), b"HELLO");
    assert_eq!(entry.size(), 5);
    assert!(entry.is_loaded());
    assert_eq!(entry.state(), EntryState::Unmodified);
    assert_eq!(entry.entry_type().unwrap().id(), "text");
    assert!(!archive.is_modified());
}

#[test]
fn test_open_rejects_block_size_zero() {
    let mut archive = archive_named("level.bz2");
    let mut data = b"BZh0".to_vec();
    data.extend_from_slice(&[0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0, 0, 0, 0, 0, 0]);

    let err = archive.open(&ByteBuffer::from(data)).unwrap_err();
    assert!(err.is_format_mismatch());
    assert_eq!(archive.num_entries(), 0);
}

#[test]
fn test_open_corrupt_payload_leaves_tree_empty() {
    let mut archive = archive_named("level.bz2");
    let events = record_events(&mut archive);
    let mut data = b"BZh5".to_vec();
    data.extend_from_slice(&[0xFF; 40]);

    let err = archive.open(&ByteBuffer::from(data)).unwrap_err();
    assert!(err.is_codec_failure());
    assert_eq!(archive.num_entries(), 0);
    assert!(!archive.is_modified());
    assert!(!archive.core().is_muted());
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_failed_reopen_keeps_previous_tree() {
    let mut archive = open_named("first.bz2", b"original");
    let mut data = b"BZh5".to_vec();
    data.extend_from_slice(&[0xFF; 40]);

    assert!(archive.open(&ByteBuffer::from(data)).is_err());
    let entry = archive.find_first(&SearchOptions::new()).unwrap();
    assert_eq!(entry.name(), "first");
    assert_eq!(entry.data(), b"original");
}

#[test]
fn test_reopen_replaces_tree() {
    let mut archive = open_named("first.bz2", b"original");
    archive.open(&bzip2_buffer(9, b"second")).unwrap();
    assert_eq!(archive.num_entries(), 1);
    assert_eq!(archive.find_first(&SearchOptions::new()).unwrap().data(), b"second");
}

#[test]
fn test_open_empty_payload() {
    let mut archive = archive_named("empty.bz2");
    archive.open(&bzip2_buffer(9, b"")).unwrap();
    let entry = archive.core().entry("empty").unwrap();
    assert_eq!(entry.size(), 0);
    assert!(entry.data().is_empty());
}

#[test]
fn test_open_concatenated_streams() {
    let mut data = bzip2_bytes(9, b"HELLO");
    data.extend_from_slice(&bzip2_bytes(9, b"WORLD"));

    let mut archive = archive_named("level.bz2");
    archive.open(&ByteBuffer::from(data)).unwrap();
    assert_eq!(archive.core().entry("level").unwrap().data(), b"HELLOWORLD");
}

#[test]
fn test_open_without_filename() {
    let mut archive = Bzip2Archive::new();
    archive.open(&bzip2_buffer(9, b"data")).unwrap();
    assert!(archive.core().entry("unnamed").is_some());
}

// =============================================================================
// Entry name derivation
// =============================================================================

#[test]
fn test_entry_name_rewrites() {
    let cases = [
        ("foo.tbz", "foo.tar"),
        ("foo.tb2", "foo.tar"),
        ("foo.tbz2", "foo.tar"),
        ("foo.bz2", "foo"),
        ("foo.xyz", "foo.xyz"),
        ("FOO.BZ2", "FOO"),
        ("Pack.TBZ2", "Pack.tar"),
    ];
    for (filename, expected) in cases {
        let archive = open_named(filename, b"payload");
        let entry = archive.find_first(&SearchOptions::new()).unwrap();
        assert_eq!(entry.name(), expected, "derived from {}", filename);
    }
}

#[test]
fn test_open_file_uses_path_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "maps.tbz", &bzip2_bytes(9, b"tar bytes"));

    let mut archive = Bzip2Archive::new();
    archive.open_file(&path).unwrap();
    assert_eq!(archive.core().filename(), Some(path.as_path()));
    assert!(archive.core().entry("maps.tar").is_some());
}

#[test]
fn test_open_file_failure_restores_filename() {
    let dir = tempfile::tempdir().unwrap();
    let bad = common::write_file(dir.path(), "bad.bz2", b"definitely not bzip2");

    let mut archive = archive_named("good.bz2");
    assert!(archive.open_file(&bad).is_err());
    assert_eq!(archive.core().file_name(), Some("good.bz2"));

    let err = archive.open_file(Path::new("/nonexistent/level.bz2")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// =============================================================================
// Write
// =============================================================================

#[test]
fn test_write_roundtrip() {
    let mut archive = open_named("level.bz2", b"HELLO");
    let mut out = ByteBuffer::new();
    archive.write(&mut out, true).unwrap();
    assert!(Bzip2Archive::is_this_format(out.data()));

    let mut reopened = archive_named("level.bz2");
    reopened.open(&out).unwrap();
    assert_eq!(reopened.find_first(&SearchOptions::new()).unwrap().data(), b"HELLO");
}

#[test]
fn test_write_roundtrip_highly_compressible() {
    let blank = vec![0u8; 256 * 1024];
    let mut archive = Bzip2Archive::new();
    archive
        .core_mut()
        .add_entry("", Entry::with_data("BLANK", &blank))
        .unwrap();
    let mut out = ByteBuffer::new();
    archive.write(&mut out, true).unwrap();
    assert!(out.size() * 1000 < blank.len());

    let mut reopened = Bzip2Archive::new();
    reopened.open(&out).unwrap();
    assert_eq!(reopened.core().entry("unnamed").unwrap().data(), blank.as_slice());
}

#[test]
fn test_registry_opens_repetitive_payload() {
    let payload = b"ab".repeat(50_000);
    let mut archive = Bzip2Archive::new();
    archive
        .core_mut()
        .add_entry("", Entry::with_data("pattern", &payload))
        .unwrap();
    let mut out = ByteBuffer::new();
    archive.write(&mut out, true).unwrap();

    let opened = FormatRegistry::with_builtin().open(&out, None).unwrap();
    assert_eq!(opened.num_entries(), 1);
    assert_eq!(opened.core().entry("unnamed").unwrap().data(), payload.as_slice());
}

#[test]
fn test_write_requires_exactly_one_entry() {
    let mut archive = Bzip2Archive::new();
    let mut out = ByteBuffer::from(&b"untouched"[..]);

    let err = archive.write(&mut out, true).unwrap_err();
    assert!(matches!(err, Error::EntryCount { expected: 1, actual: 0, .. }));
    assert_eq!(out.data(), b"untouched");

    archive.core_mut().add_entry("", Entry::with_data("a", b"a")).unwrap();
    archive.core_mut().add_entry("", Entry::with_data("b", b"b")).unwrap();
    let err = archive.write(&mut out, true).unwrap_err();
    assert!(err.is_invariant_violation());
    assert_eq!(out.data(), b"untouched");

    archive.core_mut().remove_entry("b").unwrap();
    archive.write(&mut out, true).unwrap();
    assert_ne!(out.data(), b"untouched");
}

#[test]
fn test_write_update_resets_entry_state() {
    let mut archive = open_named("level.bz2", b"HELLO");
    archive.core_mut().import_entry_data("level", b"WORLD").unwrap();
    assert_eq!(archive.core().entry("level").unwrap().state(), EntryState::Modified);

    let mut out = ByteBuffer::new();
    archive.write(&mut out, false).unwrap();
    assert_eq!(archive.core().entry("level").unwrap().state(), EntryState::Modified);

    archive.write(&mut out, true).unwrap();
    assert_eq!(archive.core().entry("level").unwrap().state(), EntryState::Unmodified);
}

#[test]
fn test_save_file_clears_modified() {
    let dir = tempfile::tempdir().unwrap();
    let mut archive = open_named("level.bz2", b"HELLO");
    let events = record_events(&mut archive);
    archive.core_mut().import_entry_data("level", b"WORLD").unwrap();
    assert!(archive.is_modified());

    let path = dir.path().join("saved.bz2");
    archive.save_file(&path).unwrap();
    assert!(!archive.is_modified());
    assert!(Bzip2Archive::is_this_file(&path));
    assert_eq!(
        *events.lock().unwrap(),
        [ArchiveEvent::Modified, ArchiveEvent::Saved]
    );

    let mut reopened = Bzip2Archive::new();
    reopened.open_file(&path).unwrap();
    assert_eq!(reopened.core().entry("saved").unwrap().data(), b"WORLD");
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_find_on_single_entry() {
    let archive = open_named("level.bz2", b"HELLO");
    let all = archive.find_all(&SearchOptions::new());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name(), "level");

    let first = archive.find_first(&SearchOptions::new()).unwrap();
    let last = archive.find_last(&SearchOptions::new()).unwrap();
    assert_eq!(first.name(), last.name());

    assert!(archive.find_first(&SearchOptions::new().name("LEV*")).is_some());
    assert!(archive.find_first(&SearchOptions::new().name("*.wad")).is_none());
}

#[test]
fn test_find_by_type() {
    let types = EntryTypeRegistry::builtin();
    let archive = open_named("level.bz2", b"HELLO");

    let text = types.by_id("text").unwrap().clone();
    assert!(archive.find_first(&SearchOptions::new().entry_type(text)).is_some());

    let png = types.by_id("png").unwrap().clone();
    assert!(archive.find_first(&SearchOptions::new().entry_type(png.clone())).is_none());
    assert!(archive.find_all(&SearchOptions::new().entry_type(png)).is_empty());
}

#[test]
fn test_find_probes_unknown_entries() {
    let archive = open_named("blob.bz2", &[0x00, 0xFF, 0x00, 0x01]);
    let entry = archive.find_first(&SearchOptions::new()).unwrap();
    assert_eq!(entry.entry_type().unwrap().id(), "unknown");

    let claims_all = std::sync::Arc::new(EntryType::new("any", "Anything", |_| true));
    assert!(archive.find_first(&SearchOptions::new().entry_type(claims_all)).is_some());

    let claims_none = std::sync::Arc::new(EntryType::new("none", "Nothing", |_| false));
    assert!(archive.find_first(&SearchOptions::new().entry_type(claims_none)).is_none());
}

// =============================================================================
// Notifications and lazy loading
// =============================================================================

#[test]
fn test_open_announces_once() {
    let mut archive = archive_named("level.bz2");
    let events = record_events(&mut archive);
    archive.open(&bzip2_buffer(9, b"HELLO")).unwrap();
    assert_eq!(*events.lock().unwrap(), [ArchiveEvent::Opened]);
    assert!(!archive.core().is_muted());

    archive.close();
    assert_eq!(archive.num_entries(), 0);
    assert_eq!(events.lock().unwrap().last(), Some(&ArchiveEvent::Closed));
}

#[test]
fn test_load_entry_data_always_fails() {
    let mut archive = open_named("level.bz2", b"HELLO");
    let err = archive.load_entry_data("level").unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    assert_eq!(archive.core().entry("level").unwrap().data(), b"HELLO");
}
