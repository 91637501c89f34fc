//! Deflate-family codecs: gzip and zlib framing.

use std::io::{self, BufRead, Read, Write};

use flate2::Compression;
use flate2::bufread::{GzDecoder, ZlibDecoder as FlateZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder as FlateZlibEncoder};

use super::{Codec, Decoder, Encoder};

/// gzip member header: ID1, ID2 and the deflate compression method.
pub const GZIP_MAGIC: &[u8; 3] = &[0x1F, 0x8B, 0x08];

/// Deflate encoder options.
#[derive(Debug, Clone)]
pub struct DeflateEncoderOptions {
    /// Compression level (0-9, default 6).
    pub level: u32,
}

impl Default for DeflateEncoderOptions {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateEncoderOptions {
    /// Creates options with the given compression level.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

/// gzip decoder.
pub struct GzipDecoder<R> {
    inner: GzDecoder<R>,
}

impl<R> std::fmt::Debug for GzipDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send> GzipDecoder<R> {
    /// Creates a new gzip decoder.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source (must implement BufRead)
    pub fn new(input: R) -> Self {
        Self {
            inner: GzDecoder::new(input),
        }
    }

    /// Returns the original file name stored in the member header, if any.
    pub fn original_name(&self) -> Option<String> {
        self.inner
            .header()
            .and_then(|h| h.filename())
            .filter(|name| !name.is_empty())
            .map(|name| String::from_utf8_lossy(name).into_owned())
    }
}

impl<R: BufRead + Send> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead + Send> Decoder for GzipDecoder<R> {
    fn codec(&self) -> Codec {
        Codec::Gzip
    }
}

/// gzip encoder.
pub struct GzipEncoder<W: Write> {
    inner: GzEncoder<W>,
}

impl<W: Write> std::fmt::Debug for GzipEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipEncoder").finish_non_exhaustive()
    }
}

impl<W: Write + Send> GzipEncoder<W> {
    /// Creates a new gzip encoder.
    pub fn new(output: W, options: &DeflateEncoderOptions) -> Self {
        Self {
            inner: GzEncoder::new(output, Compression::new(options.level)),
        }
    }

    /// Finishes encoding and returns the destination.
    pub fn try_finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write + Send> Write for GzipEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Send> Encoder for GzipEncoder<W> {
    fn codec(&self) -> Codec {
        Codec::Gzip
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}

/// zlib decoder.
pub struct ZlibDecoder<R> {
    inner: FlateZlibDecoder<R>,
}

impl<R> std::fmt::Debug for ZlibDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZlibDecoder").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send> ZlibDecoder<R> {
    /// Creates a new zlib decoder.
    pub fn new(input: R) -> Self {
        Self {
            inner: FlateZlibDecoder::new(input),
        }
    }
}

impl<R: BufRead + Send> Read for ZlibDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: BufRead + Send> Decoder for ZlibDecoder<R> {
    fn codec(&self) -> Codec {
        Codec::Zlib
    }
}

/// zlib encoder.
pub struct ZlibEncoder<W: Write> {
    inner: FlateZlibEncoder<W>,
}

impl<W: Write> std::fmt::Debug for ZlibEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZlibEncoder").finish_non_exhaustive()
    }
}

impl<W: Write + Send> ZlibEncoder<W> {
    /// Creates a new zlib encoder.
    pub fn new(output: W, options: &DeflateEncoderOptions) -> Self {
        Self {
            inner: FlateZlibEncoder::new(output, Compression::new(options.level)),
        }
    }
}

impl<W: Write + Send> Write for ZlibEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Send> Encoder for ZlibEncoder<W> {
    fn codec(&self) -> Codec {
        Codec::Zlib
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}
