// SPDX-License-Identifier: Apache-2.0

use crate::lookahead::Input;

/// Internal invariant violations.
///
/// These indicate a bug in the engine rather than bad input. A parser that
/// reports one of these must not be driven any further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedState {
    /// A byte was pushed back while another one was already buffered.
    DoublePushBack,
    /// A new scalar started while the previous payload was still open.
    UnfinishedPayload,
    /// The expectation stack ran dry before end of input was matched.
    EmptyExpectationStack,
    /// A value-start matcher accepted a byte no production handles.
    UnhandledValueStart(u8),
    /// A matcher that has no dispatch branch was returned by `expect`.
    UnhandledMatcher,
    /// An object member arrived without a pending key.
    MissingObjectKey,
    /// A close event arrived with no open container.
    UnbalancedClose,
    /// The event stream ended before the document was complete.
    TruncatedEventStream,
}

/// Errors that can occur while parsing JSON or decoding UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A byte (or end of input) failed every active matcher.
    ///
    /// `position` is the 1-based offset of the offending byte. For end of
    /// input it is one past the last byte read.
    UnexpectedCharacter { found: Input, position: usize },
    /// Malformed UTF-8 under the strict error policy.
    InvalidEncoding { position: usize },
    /// A numeric payload could not be converted to a float.
    InvalidNumber,
    /// Error from the underlying reader (I/O error, not end-of-stream)
    ReaderError,
    /// The engine entered an unexpected internal state.
    Unexpected(UnexpectedState),
}

impl ParseError {
    pub(crate) fn unexpected(found: Input, consumed: usize) -> Self {
        let position = match found {
            Input::Byte(_) => consumed,
            Input::EndOfSource => consumed.saturating_add(1),
        };
        ParseError::UnexpectedCharacter { found, position }
    }

    /// Byte offset associated with the error, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::InvalidEncoding { position } => Some(*position),
            _ => None,
        }
    }
}

impl From<UnexpectedState> for ParseError {
    fn from(info: UnexpectedState) -> Self {
        ParseError::Unexpected(info)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::UnexpectedCharacter {
                found: Input::Byte(b),
                position,
            } => write!(
                f,
                "Unexpected character \"{}\" at position {position}",
                b.escape_ascii()
            ),
            ParseError::UnexpectedCharacter {
                found: Input::EndOfSource,
                position,
            } => write!(f, "Unexpected end of input at position {position}"),
            ParseError::InvalidEncoding { position } => {
                write!(f, "Invalid UTF-8 encoding at byte number: {position}")
            }
            _ => write!(f, "{self:?}"),
        }
    }
}

impl core::error::Error for ParseError {}
