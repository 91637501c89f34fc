//! Fuzz target for opening arbitrary bytes as an archive.
//!
//! Exercises format detection, both single-stream formats, and the codecs
//! with malformed or adversarial input. Any outcome other than a panic or a
//! hang is acceptable.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use resarc::{
    Archive, ArchiveFormat, Bzip2Archive, ByteBuffer, FormatRegistry, GzipArchive, SearchOptions,
};

fuzz_target!(|data: &[u8]| {
    let buffer = ByteBuffer::from(data);

    // Detection must agree with the format's own probe
    let registry = FormatRegistry::with_builtin();
    let detected = registry.detect(data);
    assert_eq!(
        detected == Some(ArchiveFormat::Bzip2),
        Bzip2Archive::is_this_format(data)
    );

    let mut archive = Bzip2Archive::new();
    match archive.open(&buffer) {
        Ok(()) => {
            assert_eq!(archive.num_entries(), 1);
            let mut out = ByteBuffer::new();
            let _ = archive.write(&mut out, false);
        }
        Err(_) => assert_eq!(archive.num_entries(), 0),
    }

    let mut archive = GzipArchive::new();
    if archive.open(&buffer).is_err() {
        assert_eq!(archive.num_entries(), 0);
    }

    if let Ok(archive) = registry.open(&buffer, None) {
        let _ = archive.find_all(&SearchOptions::new().name("*"));
    }
});
