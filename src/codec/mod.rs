//! Compression codecs.
//!
//! This module is the single seam between archive formats and compression
//! libraries. Formats never talk to a compression crate directly: they call
//! [`compress`] and [`decompress`] with a [`Codec`], so adding a stream codec
//! only touches this module.
//!
//! Both functions borrow their input immutably and build the output in a
//! fresh buffer, so a failed call leaves the caller's data untouched.
//!
//! # Example
//!
//! ```rust
//! use resarc::ResourceLimits;
//! use resarc::codec::{self, Codec};
//!
//! let packed = codec::compress(Codec::Bzip2, b"HELLO", 9)?;
//! assert!(packed.starts_with(b"BZh9"));
//!
//! let unpacked = codec::decompress(Codec::Bzip2, &packed, &ResourceLimits::default())?;
//! assert_eq!(unpacked, b"HELLO");
//! # Ok::<(), resarc::Error>(())
//! ```

pub mod bzip2;

#[cfg(feature = "deflate")]
pub mod deflate;

use std::io::{self, Read, Write};

use crate::options::ResourceLimits;
use crate::safety::LimitedReader;
use crate::{Error, Result};

pub use self::bzip2::{Bzip2Decoder, Bzip2Encoder, Bzip2EncoderOptions};

#[cfg(feature = "deflate")]
pub use deflate::{
    DeflateEncoderOptions, GzipDecoder, GzipEncoder, ZlibDecoder, ZlibEncoder,
};

/// A decoder that reads compressed data and produces uncompressed output.
pub trait Decoder: Read + Send {
    /// Returns the codec this decoder implements.
    fn codec(&self) -> Codec;
}

/// An encoder that takes uncompressed data and produces compressed output.
pub trait Encoder: Write + Send {
    /// Returns the codec this encoder implements.
    fn codec(&self) -> Codec;

    /// Finishes encoding and flushes any remaining data.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Stream compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Codec {
    /// bzip2 (Burrows-Wheeler).
    Bzip2,
    /// Deflate with gzip framing (requires the `deflate` feature).
    Gzip,
    /// Deflate with zlib framing (requires the `deflate` feature).
    Zlib,
}

impl Codec {
    /// Returns a human-readable name for this codec.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Bzip2 => "bzip2",
            Codec::Gzip => "gzip",
            Codec::Zlib => "zlib",
        }
    }

    /// Returns the level used when none is configured.
    pub fn default_level(&self) -> u32 {
        match self {
            Codec::Bzip2 => 9,
            Codec::Gzip | Codec::Zlib => 6,
        }
    }

    /// Returns whether support for this codec is compiled in.
    pub fn is_supported(&self) -> bool {
        match self {
            Codec::Bzip2 => true,
            Codec::Gzip | Codec::Zlib => cfg!(feature = "deflate"),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn unsupported(codec: Codec) -> Error {
    Error::Codec {
        codec,
        reason: "support not compiled in".into(),
    }
}

/// Builds a decoder for `codec` reading from `input`.
pub fn build_decoder<'a>(codec: Codec, input: &'a [u8]) -> Result<Box<dyn Decoder + 'a>> {
    match codec {
        Codec::Bzip2 => Ok(Box::new(Bzip2Decoder::new(input))),
        #[cfg(feature = "deflate")]
        Codec::Gzip => Ok(Box::new(GzipDecoder::new(input))),
        #[cfg(feature = "deflate")]
        Codec::Zlib => Ok(Box::new(ZlibDecoder::new(input))),
        #[allow(unreachable_patterns)]
        _ => Err(unsupported(codec)),
    }
}

/// Builds an encoder for `codec` writing into `output`.
///
/// `level` is clamped to the range the codec accepts.
pub fn build_encoder<'a, W: Write + Send + 'a>(
    codec: Codec,
    output: W,
    level: u32,
) -> Result<Box<dyn Encoder + 'a>> {
    match codec {
        Codec::Bzip2 => Ok(Box::new(Bzip2Encoder::new(
            output,
            &Bzip2EncoderOptions::with_level(level),
        ))),
        #[cfg(feature = "deflate")]
        Codec::Gzip => Ok(Box::new(GzipEncoder::new(
            output,
            &DeflateEncoderOptions::with_level(level),
        ))),
        #[cfg(feature = "deflate")]
        Codec::Zlib => Ok(Box::new(ZlibEncoder::new(
            output,
            &DeflateEncoderOptions::with_level(level),
        ))),
        #[allow(unreachable_patterns)]
        _ => Err(unsupported(codec)),
    }
}

/// Compresses `data` with `codec` at `level`.
///
/// Zero-length input produces a valid stream that decodes to nothing.
pub fn compress(codec: Codec, data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = build_encoder(codec, &mut out, level)?;
        encoder
            .write_all(data)
            .map_err(|e| Error::from_codec_io(codec, e))?;
        encoder
            .finish()
            .map_err(|e| Error::from_codec_io(codec, e))?;
    }
    log::debug!(
        "{} compressed {} bytes into {} bytes",
        codec,
        data.len(),
        out.len()
    );
    Ok(out)
}

/// Decompresses `data` with `codec`, enforcing `limits` on the output.
///
/// Zero-length input decodes to zero-length output.
pub fn decompress(codec: Codec, data: &[u8], limits: &ResourceLimits) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let decoder = build_decoder(codec, data)?;
    let mut reader = LimitedReader::with_limits(decoder, limits, data.len() as u64);
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|e| Error::from_codec_io(codec, e))?;
    Ok(out)
}
