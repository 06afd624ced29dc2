// SPDX-License-Identifier: Apache-2.0

//! Lazy scalar payloads.
//!
//! String, number and key events do not carry their bytes. They carry a
//! [`Payload`] that pulls those bytes from the byte source on demand, so a
//! multi-megabyte string costs no more memory than a short one unless the
//! caller decides to collect it.

use alloc::vec::Vec;

use crate::lookahead::{Input, Lookahead};
use crate::matcher::Class;
use crate::parse_error::{ParseError, UnexpectedState};
use crate::Reader;

/// Position inside the numeric grammar `[-0-9][0-9]*(\.[0-9][0-9]*)?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberPhase {
    /// The leading sign or digit, pushed back by the engine.
    Lead,
    Integer,
    /// Right after `.`, a digit is mandatory.
    FractionFirst,
    Fraction,
}

/// The scalar currently being streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarState {
    /// Inside a string, after the opening quote.
    String,
    Number(NumberPhase),
}

/// The lookahead reader plus the state of the scalar being streamed.
///
/// Errors are sticky: once a byte fails, every later request reports the
/// same error without touching the source again.
#[derive(Debug)]
pub(crate) struct Cursor<R> {
    pub lookahead: Lookahead<R>,
    scalar: Option<ScalarState>,
    failure: Option<ParseError>,
}

impl<R: Reader> Cursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lookahead: Lookahead::new(reader),
            scalar: None,
            failure: None,
        }
    }

    /// Starts streaming a scalar. The previous one must be finished.
    pub fn begin(&mut self, scalar: ScalarState) -> Result<(), ParseError> {
        if self.scalar.is_some() {
            return Err(UnexpectedState::UnfinishedPayload.into());
        }
        self.scalar = Some(scalar);
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        self.scalar.is_some()
    }

    pub fn failure(&self) -> Option<&ParseError> {
        self.failure.as_ref()
    }

    /// Records `error` as the terminal state and returns it.
    pub fn fail(&mut self, error: ParseError) -> ParseError {
        log::debug!("parse failed: {error}");
        self.scalar = None;
        self.failure = Some(error.clone());
        error
    }

    /// Next byte of the current scalar, or `None` once it has ended.
    pub fn next_scalar_byte(&mut self) -> Result<Option<u8>, ParseError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.step().map_err(|e| self.fail(e))
    }

    /// Consumes whatever is left of the current scalar.
    pub fn drain(&mut self) -> Result<(), ParseError> {
        while self.next_scalar_byte()?.is_some() {}
        Ok(())
    }

    fn step(&mut self) -> Result<Option<u8>, ParseError> {
        let Some(state) = self.scalar else {
            return Ok(None);
        };
        let input = self.lookahead.next_byte()?;
        match (state, input) {
            (ScalarState::String, Input::Byte(b'"')) => self.finish(),
            (ScalarState::String, Input::Byte(b)) => Ok(Some(b)),
            (ScalarState::String, Input::EndOfSource) => Err(self.unexpected(input)),

            (ScalarState::Number(NumberPhase::Lead), Input::Byte(b))
                if Class::NumberStart.test(b) =>
            {
                self.scalar = Some(ScalarState::Number(NumberPhase::Integer));
                Ok(Some(b))
            }
            (ScalarState::Number(NumberPhase::Integer), Input::Byte(b'.')) => {
                self.scalar = Some(ScalarState::Number(NumberPhase::FractionFirst));
                Ok(Some(b'.'))
            }
            (ScalarState::Number(NumberPhase::FractionFirst), Input::Byte(b))
                if b.is_ascii_digit() =>
            {
                self.scalar = Some(ScalarState::Number(NumberPhase::Fraction));
                Ok(Some(b))
            }
            (
                ScalarState::Number(NumberPhase::Integer | NumberPhase::Fraction),
                Input::Byte(b),
            ) if b.is_ascii_digit() => Ok(Some(b)),
            (ScalarState::Number(NumberPhase::Integer | NumberPhase::Fraction), _) => {
                // The terminator belongs to whatever follows the number
                self.lookahead.push_back(input)?;
                self.finish()
            }
            (ScalarState::Number(_), _) => Err(self.unexpected(input)),
        }
    }

    fn finish(&mut self) -> Result<Option<u8>, ParseError> {
        self.scalar = None;
        Ok(None)
    }

    pub fn unexpected(&self, input: Input) -> ParseError {
        ParseError::unexpected(input, self.lookahead.position())
    }
}

/// Object-safe view of a [`Cursor`] so that [`Payload`] does not carry the
/// reader type.
pub(crate) trait ScalarSource {
    fn next_scalar_byte(&mut self) -> Result<Option<u8>, ParseError>;
    fn is_streaming(&self) -> bool;
}

impl<R: Reader> ScalarSource for Cursor<R> {
    fn next_scalar_byte(&mut self) -> Result<Option<u8>, ParseError> {
        Cursor::next_scalar_byte(self)
    }

    fn is_streaming(&self) -> bool {
        Cursor::is_streaming(self)
    }
}

/// The raw bytes of a string, number or key, read lazily from the source.
///
/// String payloads exclude the surrounding quotes and are not unescaped or
/// UTF-8 decoded. Number payloads are the literal digits.
///
/// A payload borrows the parser, so it has to be finished or dropped before
/// the next event can be requested. Bytes left unread when that happens are
/// drained by the parser.
///
/// # Example
/// ```
/// use lazyjson::{ChunkReader, Event, Parser};
///
/// let mut parser = Parser::new(ChunkReader::full_slice(br#""hello""#));
/// match parser.next_event().unwrap() {
///     Event::String(payload) => assert_eq!(payload.into_vec().unwrap(), b"hello"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub struct Payload<'p> {
    source: &'p mut dyn ScalarSource,
    errored: bool,
}

impl<'p> Payload<'p> {
    pub(crate) fn new(source: &'p mut dyn ScalarSource) -> Self {
        Self {
            source,
            errored: false,
        }
    }

    /// Returns `true` once every byte of the scalar has been read.
    pub fn is_finished(&self) -> bool {
        !self.source.is_streaming()
    }

    /// Reads payload bytes into `buf`, returning how many were written.
    /// Returns 0 only when the payload is finished or `buf` is empty.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let mut written = 0;
        for slot in buf.iter_mut() {
            match self.source.next_scalar_byte()? {
                Some(b) => {
                    *slot = b;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }

    /// Collects the remaining bytes.
    pub fn into_vec(self) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::new();
        while let Some(b) = self.source.next_scalar_byte()? {
            bytes.push(b);
        }
        Ok(bytes)
    }

    /// Skips the remaining bytes, still checking them against the grammar.
    pub fn drain(self) -> Result<(), ParseError> {
        while self.source.next_scalar_byte()?.is_some() {}
        Ok(())
    }
}

impl Iterator for Payload<'_> {
    type Item = Result<u8, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }
        let item = self.source.next_scalar_byte().transpose();
        self.errored = matches!(item, Some(Err(_)));
        item
    }
}

impl core::iter::FusedIterator for Payload<'_> {}

/// A payload is itself a byte source, so a string can be fed to a
/// [`Utf8Decoder`](crate::Utf8Decoder) without collecting it first.
impl Reader for Payload<'_> {
    type Error = ParseError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ParseError> {
        Payload::read(self, buf)
    }
}

impl core::fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Payload")
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkReader;

    fn cursor(data: &'static [u8]) -> Cursor<ChunkReader<'static>> {
        Cursor::new(ChunkReader::new(data, 1))
    }

    fn number(data: &'static [u8]) -> (Result<Vec<u8>, ParseError>, Input) {
        let mut c = cursor(data);
        c.begin(ScalarState::Number(NumberPhase::Lead)).unwrap();
        let bytes = Payload::new(&mut c).into_vec();
        let next = c.lookahead.next_byte().unwrap_or(Input::EndOfSource);
        (bytes, next)
    }

    #[test]
    fn test_string_stops_at_quote() {
        let mut c = cursor(b"abc\" ,");
        c.begin(ScalarState::String).unwrap();
        let bytes = Payload::new(&mut c).into_vec().unwrap();
        assert_eq!(bytes, b"abc");
        // The closing quote is consumed, the rest is not
        assert_eq!(c.lookahead.next_byte(), Ok(Input::Byte(b' ')));
    }

    #[test]
    fn test_string_bytes_are_raw() {
        let mut c = cursor(b"a\\n\xe2\x82\xac\"");
        c.begin(ScalarState::String).unwrap();
        let bytes = Payload::new(&mut c).into_vec().unwrap();
        assert_eq!(bytes, b"a\\n\xe2\x82\xac");
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let mut c = cursor(b"abc");
        c.begin(ScalarState::String).unwrap();
        let err = Payload::new(&mut c).into_vec().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedCharacter {
                found: Input::EndOfSource,
                position: 4
            }
        );
        // Sticky
        assert_eq!(c.next_scalar_byte(), Err(err));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number(b"42,"), (Ok(b"42".to_vec()), Input::Byte(b',')));
        assert_eq!(number(b"-1.50]"), (Ok(b"-1.50".to_vec()), Input::Byte(b']')));
        assert_eq!(number(b"007"), (Ok(b"007".to_vec()), Input::EndOfSource));
        assert_eq!(number(b"-}"), (Ok(b"-".to_vec()), Input::Byte(b'}')));
        // No exponent support, the `e` is left for the engine
        assert_eq!(number(b"1e5"), (Ok(b"1".to_vec()), Input::Byte(b'e')));
    }

    #[test]
    fn test_number_needs_fraction_digit() {
        let (bytes, _) = number(b"1.]");
        assert_eq!(
            bytes,
            Err(ParseError::UnexpectedCharacter {
                found: Input::Byte(b']'),
                position: 3
            })
        );

        let (bytes, _) = number(b"1. 5");
        assert!(bytes.is_err());
    }

    #[test]
    fn test_read_in_chunks() {
        let mut c = cursor(b"abcdefg\"");
        c.begin(ScalarState::String).unwrap();
        let mut payload = Payload::new(&mut c);
        let mut buf = [0u8; 3];
        assert_eq!(payload.read(&mut buf), Ok(3));
        assert_eq!(&buf, b"abc");
        assert!(!payload.is_finished());
        assert_eq!(payload.read(&mut buf), Ok(3));
        assert_eq!(payload.read(&mut buf), Ok(1));
        assert_eq!(buf[0], b'g');
        assert!(payload.is_finished());
        assert_eq!(payload.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut c = cursor(b"ab");
        c.begin(ScalarState::String).unwrap();
        let mut payload = Payload::new(&mut c);
        assert_eq!(payload.next(), Some(Ok(b'a')));
        assert_eq!(payload.next(), Some(Ok(b'b')));
        assert!(matches!(payload.next(), Some(Err(_))));
        assert_eq!(payload.next(), None);
    }

    #[test]
    fn test_begin_twice_is_fatal() {
        let mut c = cursor(b"x\"");
        c.begin(ScalarState::String).unwrap();
        assert_eq!(
            c.begin(ScalarState::String),
            Err(ParseError::Unexpected(UnexpectedState::UnfinishedPayload))
        );
    }

    #[test]
    fn test_payload_as_reader() {
        let mut c = cursor(b"\xc3\xa9t\xc3\xa9\"");
        c.begin(ScalarState::String).unwrap();
        let mut decoder = crate::Utf8Decoder::new(Payload::new(&mut c));
        assert_eq!(decoder.read(10).unwrap(), "\u{e9}t\u{e9}");
    }

    #[test]
    fn test_drain() {
        let mut c = cursor(b"skip me\"}");
        c.begin(ScalarState::String).unwrap();
        Payload::new(&mut c).drain().unwrap();
        assert!(!c.is_streaming());
        assert_eq!(c.lookahead.next_byte(), Ok(Input::Byte(b'}')));
    }
}
