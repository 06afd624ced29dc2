// SPDX-License-Identifier: Apache-2.0

use crate::matcher::is_whitespace;
use crate::parse_error::{ParseError, UnexpectedState};
use crate::Reader;

/// One unit read from a byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A raw byte.
    Byte(u8),
    /// The source is exhausted.
    EndOfSource,
}

impl Input {
    /// Returns the byte, or `None` at end of source.
    pub fn byte(self) -> Option<u8> {
        match self {
            Input::Byte(b) => Some(b),
            Input::EndOfSource => None,
        }
    }
}

/// Byte-at-a-time view of a [`Reader`] with one unit of pushback.
///
/// Reads never go further ahead than the byte being examined, so the
/// underlying source is positioned exactly after the last byte the engine
/// has looked at (plus the pushed-back one, if any).
#[derive(Debug)]
pub(crate) struct Lookahead<R> {
    reader: R,
    pushed: Option<Input>,
    /// Raw bytes pulled from the reader. Re-reading a pushed-back byte does
    /// not count again.
    consumed: usize,
    exhausted: bool,
}

impl<R: Reader> Lookahead<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pushed: None,
            consumed: 0,
            exhausted: false,
        }
    }

    /// Returns the pushed-back unit if there is one, otherwise reads one byte.
    pub fn next_byte(&mut self) -> Result<Input, ParseError> {
        if let Some(input) = self.pushed.take() {
            return Ok(input);
        }
        if self.exhausted {
            return Ok(Input::EndOfSource);
        }
        let mut buf = [0u8; 1];
        let read = self
            .reader
            .read(&mut buf)
            .map_err(|_| ParseError::ReaderError)?;
        if read == 0 {
            self.exhausted = true;
            return Ok(Input::EndOfSource);
        }
        self.consumed = self.consumed.saturating_add(1);
        Ok(Input::Byte(buf[0]))
    }

    /// Skips whitespace and returns the first other byte or end of source.
    pub fn next_nonspace_byte(&mut self) -> Result<Input, ParseError> {
        loop {
            match self.next_byte()? {
                Input::Byte(b) if is_whitespace(b) => continue,
                other => return Ok(other),
            }
        }
    }

    /// Buffers `input` for the next read.
    pub fn push_back(&mut self, input: Input) -> Result<(), ParseError> {
        if self.pushed.is_some() {
            return Err(UnexpectedState::DoublePushBack.into());
        }
        self.pushed = Some(input);
        Ok(())
    }

    /// Number of raw bytes read from the source so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkReader;

    #[test]
    fn test_next_byte_counts_reads() {
        let mut la = Lookahead::new(ChunkReader::new(b"ab", 1));
        assert_eq!(la.next_byte(), Ok(Input::Byte(b'a')));
        assert_eq!(la.position(), 1);
        assert_eq!(la.next_byte(), Ok(Input::Byte(b'b')));
        assert_eq!(la.next_byte(), Ok(Input::EndOfSource));
        assert_eq!(la.next_byte(), Ok(Input::EndOfSource));
        assert_eq!(la.position(), 2);
    }

    #[test]
    fn test_push_back_does_not_reposition() {
        let mut la = Lookahead::new(ChunkReader::full_slice(b"xy"));
        let x = la.next_byte().unwrap();
        la.push_back(x).unwrap();
        assert_eq!(la.position(), 1);
        assert_eq!(la.next_byte(), Ok(Input::Byte(b'x')));
        assert_eq!(la.position(), 1);
        assert_eq!(la.next_byte(), Ok(Input::Byte(b'y')));
        assert_eq!(la.position(), 2);
    }

    #[test]
    fn test_push_back_end_of_source() {
        let mut la = Lookahead::new(ChunkReader::full_slice(b""));
        let end = la.next_byte().unwrap();
        la.push_back(end).unwrap();
        assert_eq!(la.next_byte(), Ok(Input::EndOfSource));
    }

    #[test]
    fn test_double_push_back_is_fatal() {
        let mut la = Lookahead::new(ChunkReader::full_slice(b"x"));
        la.push_back(Input::Byte(b'a')).unwrap();
        assert_eq!(
            la.push_back(Input::Byte(b'b')),
            Err(ParseError::Unexpected(UnexpectedState::DoublePushBack))
        );
    }

    #[test]
    fn test_next_nonspace_byte() {
        let mut la = Lookahead::new(ChunkReader::full_slice(b" \t\r\n\x0b\x0c{ "));
        assert_eq!(la.next_nonspace_byte(), Ok(Input::Byte(b'{')));
        assert_eq!(la.position(), 7);
        assert_eq!(la.next_nonspace_byte(), Ok(Input::EndOfSource));
    }

    #[test]
    fn test_pushed_whitespace_is_skipped() {
        let mut la = Lookahead::new(ChunkReader::full_slice(b"1"));
        la.push_back(Input::Byte(b' ')).unwrap();
        assert_eq!(la.next_nonspace_byte(), Ok(Input::Byte(b'1')));
    }

    struct FailingReader;

    impl Reader for FailingReader {
        type Error = ();

        fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
            Err(())
        }
    }

    #[test]
    fn test_reader_error() {
        let mut la = Lookahead::new(FailingReader);
        assert_eq!(la.next_byte(), Err(ParseError::ReaderError));
    }
}
