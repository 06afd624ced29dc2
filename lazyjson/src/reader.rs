// SPDX-License-Identifier: Apache-2.0

//! Byte sources for the parser and the UTF-8 decoder.
//!
//! Everything in this crate pulls its input through the [`Reader`] trait.
//! [`ChunkReader`] covers in-memory data, optionally handing it out in
//! fixed-size chunks to simulate a network or file source. With the `std`
//! feature, [`IoReader`] adapts any [`std::io::Read`].
//!
//! # Examples
//!
//! ```rust
//! use lazyjson::{ChunkReader, Event, Parser};
//!
//! let json = br#"{"name": "Alice"}"#;
//! let mut parser = Parser::new(ChunkReader::new(json, 4));
//!
//! assert!(matches!(parser.next_event(), Ok(Event::ObjectOpen)));
//! ```

/// Trait for input sources that can provide data to the parser.
pub trait Reader {
    /// The error type returned by read operations
    type Error;

    /// Read data into the provided buffer.
    /// Returns the number of bytes read, or an error.
    ///
    /// # Contract
    /// - A return value of 0 **MUST** indicate true end of stream
    /// - Implementations **MUST NOT** return 0 unless no more data will ever be available
    /// - Returning 0 followed by non-zero reads in subsequent calls violates this contract
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Error = R::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

/// A [`Reader`] that reads from a byte slice, optionally in fixed-size chunks.
///
/// 1.  **Full Slice Reading**: [`ChunkReader::full_slice()`] hands out as much
///     of the slice as each `read()` call asks for.
///
/// 2.  **Chunked Reading**: [`ChunkReader::new()`] limits each `read()` call
///     to a maximum chunk size, which is how the tests exercise sources that
///     trickle data in.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a new chunked reader from a byte slice.
    ///
    /// Each call to `read()` will return at most `chunk_size` bytes
    /// (minimum 1), even if more data is available.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1), // Ensure at least 1 byte per read
        }
    }

    /// Create a new reader that consumes the entire byte slice at once.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }

    /// Number of bytes handed out so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl Reader for ChunkReader<'_> {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.get(self.pos..).unwrap_or_default();
        let to_copy = remaining.len().min(buf.len()).min(self.chunk_size);
        if let (Some(dest), Some(src)) = (buf.get_mut(..to_copy), remaining.get(..to_copy)) {
            dest.copy_from_slice(src);
            self.pos = self.pos.saturating_add(to_copy);
            Ok(to_copy)
        } else {
            Ok(0)
        }
    }
}

/// Adapts a [`std::io::Read`] into a [`Reader`].
///
/// Interrupted reads are retried; any other I/O error is reported to the
/// parser as [`crate::ParseError::ReaderError`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> IoReader<R> {
    /// Wrap an I/O source.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the I/O source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader for IoReader<R> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_slice_reader_basic() {
        let data = b"hello world";
        let mut reader = ChunkReader::full_slice(data);

        let mut buf = [0u8; 5];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b" world");

        // EOF
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.consumed(), 11);
    }

    #[test]
    fn test_full_slice_reader_empty() {
        let mut reader = ChunkReader::full_slice(b"");
        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_chunk_reader_basic() {
        let data = b"hello world";
        let mut reader = ChunkReader::new(data, 3);

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"hel");
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"lo ");
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"wor");

        // Limited by remaining data (2 < chunk_size)
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ld");

        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_chunk_reader_zero_chunk_size() {
        // Should be clamped to 1
        let mut reader = ChunkReader::new(b"hello", 0);

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'h');
    }

    #[test]
    fn test_reader_through_mut_ref() {
        let mut inner = ChunkReader::full_slice(b"ab");
        let mut reader = &mut inner;
        let mut buf = [0u8; 1];
        assert_eq!(Reader::read(&mut reader, &mut buf).unwrap(), 1);
        assert_eq!(inner.consumed(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_io_reader() {
        let mut reader = IoReader::new(std::io::Cursor::new(b"xyz".to_vec()));
        let mut buf = [0u8; 2];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf, b"xy");
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
