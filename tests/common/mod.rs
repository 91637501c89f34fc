//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use resarc::codec::{self, Codec};
use resarc::{Archive, ArchiveEvent, Bzip2Archive, ByteBuffer};

/// Compresses `payload` into a bzip2 stream with the given block size digit.
pub fn bzip2_bytes(level: u32, payload: &[u8]) -> Vec<u8> {
    codec::compress(Codec::Bzip2, payload, level).expect("bzip2 compression failed")
}

/// Same as [`bzip2_bytes`], wrapped in a [`ByteBuffer`].
pub fn bzip2_buffer(level: u32, payload: &[u8]) -> ByteBuffer {
    ByteBuffer::from(bzip2_bytes(level, payload))
}

/// Creates a bzip2 archive that believes it was loaded from `filename`.
pub fn archive_named(filename: &str) -> Bzip2Archive {
    let mut archive = Bzip2Archive::new();
    archive
        .core_mut()
        .set_filename(Some(PathBuf::from(filename)));
    archive
}

/// Opens `payload`, compressed at block size 9, as if read from `filename`.
pub fn open_named(filename: &str, payload: &[u8]) -> Bzip2Archive {
    let mut archive = archive_named(filename);
    archive
        .open(&bzip2_buffer(9, payload))
        .expect("open of a valid bzip2 stream failed");
    archive
}

/// Attaches an observer that records every announced event.
pub fn record_events(archive: &mut dyn Archive) -> Arc<Mutex<Vec<ArchiveEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    archive
        .core_mut()
        .add_observer(Box::new(move |event: ArchiveEvent| {
            sink.lock().unwrap().push(event)
        }));
    events
}

/// Writes `data` to `name` inside `dir` and returns the full path.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("failed to write test file");
    path
}
