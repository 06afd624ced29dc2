// SPDX-License-Identifier: Apache-2.0

//! Streaming UTF-8 decoder.
//!
//! Decodes one scalar at a time from a [`Reader`], reading only the bytes
//! that scalar needs. Besides standard UTF-8 it accepts the obsolete 5- and
//! 6-byte forms; anything that assembles to a value above U+10FFFF, or to a
//! surrogate, comes out as U+FFFD whatever the [`ErrorPolicy`].

use alloc::string::String;

use crate::lookahead::{Input, Lookahead};
use crate::parse_error::ParseError;
use crate::Reader;

/// What to do with a malformed byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Fail with [`ParseError::InvalidEncoding`].
    #[default]
    Strict,
    /// Emit U+FFFD in place of the malformed unit.
    Replace,
    /// Skip the malformed unit.
    Ignore,
}

/// Outcome of decoding one unit.
enum Unit {
    Scalar(char),
    /// `position` is the offset of the byte that broke the sequence.
    Malformed { position: usize },
    End,
}

/// Sequence length and payload bits of a leading byte.
fn classify(lead: u8) -> Option<(usize, u32)> {
    let lead = u32::from(lead);
    match lead {
        _ if lead & 0b1110_0000 == 0b1100_0000 => Some((2, lead & 0b0001_1111)),
        _ if lead & 0b1111_0000 == 0b1110_0000 => Some((3, lead & 0b0000_1111)),
        _ if lead & 0b1111_1000 == 0b1111_0000 => Some((4, lead & 0b0000_0111)),
        _ if lead & 0b1111_1100 == 0b1111_1000 => Some((5, lead & 0b0000_0011)),
        _ if lead & 0b1111_1110 == 0b1111_1100 => Some((6, lead & 0b0000_0001)),
        // Continuation byte or 0xFE/0xFF
        _ => None,
    }
}

fn is_continuation(b: u8) -> bool {
    b & 0b1100_0000 == 0b1000_0000
}

/// A pull-based UTF-8 decoder over a byte source.
///
/// # Example
/// ```
/// use lazyjson::{ChunkReader, ErrorPolicy, Utf8Decoder};
///
/// let mut strict = Utf8Decoder::new(ChunkReader::full_slice(b"caf\xc3\xa9"));
/// assert_eq!(strict.read(10).unwrap(), "caf\u{e9}");
///
/// let lossy = Utf8Decoder::with_policy(ChunkReader::full_slice(b"a\xffb"), ErrorPolicy::Replace);
/// let text: Result<String, _> = lossy.collect();
/// assert_eq!(text.unwrap(), "a\u{FFFD}b");
/// ```
#[derive(Debug)]
pub struct Utf8Decoder<R> {
    lookahead: Lookahead<R>,
    policy: ErrorPolicy,
    failure: Option<ParseError>,
}

impl<R: Reader> Utf8Decoder<R> {
    /// Creates a decoder with [`ErrorPolicy::Strict`].
    pub fn new(reader: R) -> Self {
        Self::with_policy(reader, ErrorPolicy::default())
    }

    pub fn with_policy(reader: R, policy: ErrorPolicy) -> Self {
        Self {
            lookahead: Lookahead::new(reader),
            policy,
            failure: None,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Raw bytes read from the source so far.
    pub fn position(&self) -> usize {
        self.lookahead.position()
    }

    /// Decodes the next scalar. `Ok(None)` means the source is exhausted.
    pub fn read_one(&mut self) -> Result<Option<char>, ParseError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        loop {
            let unit = match self.decode() {
                Ok(unit) => unit,
                Err(error) => return Err(self.fail(error)),
            };
            match unit {
                Unit::Scalar(c) => return Ok(Some(c)),
                Unit::End => return Ok(None),
                Unit::Malformed { position } => match self.policy {
                    ErrorPolicy::Strict => {
                        return Err(self.fail(ParseError::InvalidEncoding { position }))
                    }
                    ErrorPolicy::Replace => {
                        log::debug!("replacing malformed UTF-8 at byte {position}");
                        return Ok(Some(char::REPLACEMENT_CHARACTER));
                    }
                    ErrorPolicy::Ignore => {
                        log::debug!("skipping malformed UTF-8 at byte {position}");
                    }
                },
            }
        }
    }

    /// Decodes up to `n` scalars. The result is shorter only when the
    /// source runs out.
    pub fn read(&mut self, n: usize) -> Result<String, ParseError> {
        let mut text = String::new();
        for _ in 0..n {
            match self.read_one()? {
                Some(c) => text.push(c),
                None => break,
            }
        }
        Ok(text)
    }

    pub fn into_inner(self) -> R {
        self.lookahead.into_inner()
    }

    fn fail(&mut self, error: ParseError) -> ParseError {
        log::debug!("decoding failed: {error}");
        self.failure = Some(error.clone());
        error
    }

    fn decode(&mut self) -> Result<Unit, ParseError> {
        let lead = match self.lookahead.next_byte()? {
            Input::Byte(b) => b,
            Input::EndOfSource => return Ok(Unit::End),
        };
        if lead.is_ascii() {
            return Ok(Unit::Scalar(char::from(lead)));
        }
        let Some((len, mut codepoint)) = classify(lead) else {
            return Ok(Unit::Malformed {
                position: self.lookahead.position(),
            });
        };
        for _ in 1..len {
            let input = self.lookahead.next_byte()?;
            match input {
                Input::Byte(b) if is_continuation(b) => {
                    codepoint = (codepoint << 6) | u32::from(b & 0b0011_1111);
                }
                Input::Byte(_) => {
                    // This byte may start the next scalar
                    let position = self.lookahead.position();
                    self.lookahead.push_back(input)?;
                    return Ok(Unit::Malformed { position });
                }
                Input::EndOfSource => {
                    return Ok(Unit::Malformed {
                        position: self.lookahead.position() + 1,
                    });
                }
            }
        }
        Ok(Unit::Scalar(
            char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER),
        ))
    }
}

impl<R: Reader> Iterator for Utf8Decoder<R> {
    type Item = Result<char, ParseError>;

    /// Yields scalars until the source is exhausted. After an error the
    /// iterator ends.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failure.is_some() {
            return None;
        }
        self.read_one().transpose()
    }
}

impl<R: Reader> core::iter::FusedIterator for Utf8Decoder<R> {}
