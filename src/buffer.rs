//! Owned byte buffer used at every archive boundary.

use std::io::{self, Read, Write};
use std::ops::Deref;

/// A sized, owned byte sequence with a read cursor.
///
/// `ByteBuffer` is the interchange type between archives, entries, and the
/// codecs: archives are opened from one and written into one. Reads through
/// [`read`](Self::read) advance the cursor; writes through [`Write`] append.
///
/// # Example
///
/// ```rust
/// use resarc::ByteBuffer;
///
/// let mut buf = ByteBuffer::from(&b"BZh91AY&SY"[..]);
/// let mut magic = [0u8; 4];
/// assert!(buf.read(&mut magic));
/// assert_eq!(&magic, b"BZh9");
/// assert_eq!(buf.position(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes held.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the buffer contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the read cursor. Returns false if `pos` is past the end.
    pub fn seek(&mut self, pos: usize) -> bool {
        if pos > self.data.len() {
            return false;
        }
        self.pos = pos;
        true
    }

    /// Fills `dst` from the cursor and advances it.
    ///
    /// Either the whole of `dst` is filled or nothing is read.
    pub fn read(&mut self, dst: &mut [u8]) -> bool {
        if !self.read_at(self.pos, dst) {
            return false;
        }
        self.pos += dst.len();
        true
    }

    /// Fills `dst` from `offset` without touching the cursor.
    pub fn read_at(&self, offset: usize, dst: &mut [u8]) -> bool {
        match offset
            .checked_add(dst.len())
            .and_then(|end| self.data.get(offset..end))
        {
            Some(src) => {
                dst.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Replaces the contents with a copy of `data` and rewinds the cursor.
    pub fn import(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.pos = 0;
    }

    /// Replaces the contents with `data` without copying.
    pub fn replace(&mut self, data: Vec<u8>) {
        self.data = data;
        self.pos = 0;
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.data.clear();
        self.pos = 0;
    }

    /// Consumes the buffer and returns its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

impl Read for ByteBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos.min(self.data.len())..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for ByteBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
