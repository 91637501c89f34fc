//! Resource limit enforcement for decoding untrusted data.
//!
//! Archive payloads come from files the user picked up somewhere, so a tiny
//! compressed stream must not be allowed to expand into gigabytes of memory.
//! [`LimitedReader`] sits between a codec and the output buffer and aborts
//! the read once a limit is crossed.

use std::io::{self, Read};

use crate::Error;
use crate::options::ResourceLimits;

/// A reader that enforces output size and compression ratio limits.
pub struct LimitedReader<R> {
    inner: R,
    /// Maximum bytes this reader can produce.
    max_bytes: u64,
    /// Bytes produced so far.
    bytes_read: u64,
    /// Size of the compressed data (for ratio checking).
    compressed_size: u64,
    /// Maximum compression ratio allowed.
    max_ratio: Option<u32>,
}

impl<R> LimitedReader<R> {
    /// Creates a new limited reader with no limits set.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            max_bytes: u64::MAX,
            bytes_read: 0,
            compressed_size: 0,
            max_ratio: None,
        }
    }

    /// Creates a reader enforcing `limits` for a payload of `compressed_size` bytes.
    pub fn with_limits(inner: R, limits: &ResourceLimits, compressed_size: u64) -> Self {
        let reader = Self::new(inner)
            .max_bytes(limits.max_entry_size)
            .compressed_size(compressed_size);
        match limits.ratio_limit {
            Some(ratio) => reader.max_ratio(ratio),
            None => reader,
        }
    }

    /// Sets the maximum number of bytes to produce.
    pub fn max_bytes(mut self, max: u64) -> Self {
        self.max_bytes = max;
        self
    }

    /// Sets the compressed size for ratio checking.
    pub fn compressed_size(mut self, size: u64) -> Self {
        self.compressed_size = size;
        self
    }

    /// Sets the maximum compression ratio.
    pub fn max_ratio(mut self, ratio: u32) -> Self {
        self.max_ratio = Some(ratio);
        self
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            return Ok(0);
        }

        self.bytes_read += n as u64;

        if self.bytes_read > self.max_bytes {
            return Err(io::Error::other(Error::ResourceLimitExceeded(format!(
                "Entry size {} exceeds limit {}",
                self.bytes_read, self.max_bytes
            ))));
        }

        // bytes_read > max_ratio * compressed_size, without truncating division
        if let Some(max_ratio) = self.max_ratio {
            if self.compressed_size > 0 {
                let max_allowed = (max_ratio as u64).saturating_mul(self.compressed_size);
                if self.bytes_read > max_allowed {
                    let actual_ratio = self.bytes_read / self.compressed_size;
                    return Err(io::Error::other(Error::ResourceLimitExceeded(format!(
                        "Compression ratio {}:1 exceeds limit {}:1 (compressed: {}, uncompressed: {})",
                        actual_ratio, max_ratio, self.compressed_size, self.bytes_read
                    ))));
                }
            }
        }

        Ok(n)
    }
}

impl<R> std::fmt::Debug for LimitedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitedReader")
            .field("max_bytes", &self.max_bytes)
            .field("bytes_read", &self.bytes_read)
            .field("compressed_size", &self.compressed_size)
            .field("max_ratio", &self.max_ratio)
            .finish_non_exhaustive()
    }
}
