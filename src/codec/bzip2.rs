//! BZip2 codec implementation.

use std::io::{self, Read, Write};

use bzip2::Compression;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;

use super::{Codec, Decoder, Encoder};

/// The `BZh` stream marker that opens every bzip2 stream.
pub const MAGIC: &[u8; 3] = b"BZh";

/// Parses the block size digit of a bzip2 stream header.
///
/// Returns the block size in units of 100 KiB (`1..=9`), or `None` if
/// `header` does not start with `BZh` followed by an ASCII digit in
/// `'1'..='9'`. Legacy `BZ0` streams are rejected.
pub fn block_size(header: &[u8]) -> Option<u32> {
    let rest = header.strip_prefix(MAGIC.as_slice())?;
    match rest.first() {
        Some(digit @ b'1'..=b'9') => Some(u32::from(digit - b'0')),
        _ => None,
    }
}

/// BZip2 decoder.
///
/// Concatenated streams (as written by `pbzip2` or `cat a.bz2 b.bz2`) are
/// decoded back to back into one payload.
pub struct Bzip2Decoder<R> {
    inner: MultiBzDecoder<R>,
}

impl<R> std::fmt::Debug for Bzip2Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Decoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> Bzip2Decoder<R> {
    /// Creates a new BZip2 decoder.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source
    pub fn new(input: R) -> Self {
        Self {
            inner: MultiBzDecoder::new(input),
        }
    }
}

impl<R: Read + Send> Read for Bzip2Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for Bzip2Decoder<R> {
    fn codec(&self) -> Codec {
        Codec::Bzip2
    }
}

/// BZip2 encoder options.
#[derive(Debug, Clone)]
pub struct Bzip2EncoderOptions {
    /// Compression level (1-9, default 9).
    ///
    /// The level is also the block size written into the stream header.
    pub level: u32,
}

impl Default for Bzip2EncoderOptions {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl Bzip2EncoderOptions {
    /// Creates options with the given compression level.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.clamp(1, 9),
        }
    }
}

/// BZip2 encoder.
pub struct Bzip2Encoder<W: Write> {
    inner: BzEncoder<W>,
}

impl<W: Write> std::fmt::Debug for Bzip2Encoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Encoder").finish_non_exhaustive()
    }
}

impl<W: Write + Send> Bzip2Encoder<W> {
    /// Creates a new BZip2 encoder.
    ///
    /// # Arguments
    ///
    /// * `output` - The destination for compressed data
    /// * `options` - Encoder options
    pub fn new(output: W, options: &Bzip2EncoderOptions) -> Self {
        Self {
            inner: BzEncoder::new(output, Compression::new(options.level)),
        }
    }

    /// Finishes encoding and returns the destination.
    pub fn try_finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write + Send> Write for Bzip2Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Send> Encoder for Bzip2Encoder<W> {
    fn codec(&self) -> Codec {
        Codec::Bzip2
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}
