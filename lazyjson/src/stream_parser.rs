// SPDX-License-Identifier: Apache-2.0

use alloc::vec;
use alloc::vec::Vec;

use crate::lookahead::Input;
use crate::matcher::{Class, Frame, Matcher};
use crate::parse_error::{ParseError, UnexpectedState};
use crate::payload::{Cursor, NumberPhase, Payload, ScalarState};
use crate::Reader;

/// Where a scalar sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// The scalar is the whole document.
    Root,
    /// An element of an array.
    Array,
    /// The value of an object member.
    Object,
}

/// Events produced by the parser.
///
/// Scalar events are split by [`Context`] so that consumers tracking a path
/// know whether to advance an array index.
#[derive(Debug)]
pub enum Event<'p> {
    /// `{`
    ObjectOpen,
    /// `}`
    ObjectClose,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// An object key, without quotes.
    ObjectKey(Payload<'p>),
    ArrayValueString(Payload<'p>),
    ArrayValueNumber(Payload<'p>),
    ArrayValueNull,
    ObjectValueString(Payload<'p>),
    ObjectValueNumber(Payload<'p>),
    ObjectValueNull,
    /// A string that is the whole document.
    String(Payload<'p>),
    /// A number that is the whole document.
    Number(Payload<'p>),
    /// `null` as the whole document.
    Null,
    /// The source is exhausted and the document is complete.
    EndOfInput,
}

/// Payload-free discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    ObjectKey,
    ArrayValueString,
    ArrayValueNumber,
    ArrayValueNull,
    ObjectValueString,
    ObjectValueNumber,
    ObjectValueNull,
    String,
    Number,
    Null,
    EndOfInput,
}

impl EventKind {
    fn string(context: Context) -> Self {
        match context {
            Context::Root => EventKind::String,
            Context::Array => EventKind::ArrayValueString,
            Context::Object => EventKind::ObjectValueString,
        }
    }

    fn number(context: Context) -> Self {
        match context {
            Context::Root => EventKind::Number,
            Context::Array => EventKind::ArrayValueNumber,
            Context::Object => EventKind::ObjectValueNumber,
        }
    }

    fn null(context: Context) -> Self {
        match context {
            Context::Root => EventKind::Null,
            Context::Array => EventKind::ArrayValueNull,
            Context::Object => EventKind::ObjectValueNull,
        }
    }

    /// The context of a scalar value event, `None` for anything else.
    pub fn context(self) -> Option<Context> {
        match self {
            EventKind::String | EventKind::Number | EventKind::Null => Some(Context::Root),
            EventKind::ArrayValueString | EventKind::ArrayValueNumber | EventKind::ArrayValueNull => {
                Some(Context::Array)
            }
            EventKind::ObjectValueString
            | EventKind::ObjectValueNumber
            | EventKind::ObjectValueNull => Some(Context::Object),
            _ => None,
        }
    }
}

impl<'p> Event<'p> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ObjectOpen => EventKind::ObjectOpen,
            Event::ObjectClose => EventKind::ObjectClose,
            Event::ArrayOpen => EventKind::ArrayOpen,
            Event::ArrayClose => EventKind::ArrayClose,
            Event::ObjectKey(_) => EventKind::ObjectKey,
            Event::ArrayValueString(_) => EventKind::ArrayValueString,
            Event::ArrayValueNumber(_) => EventKind::ArrayValueNumber,
            Event::ArrayValueNull => EventKind::ArrayValueNull,
            Event::ObjectValueString(_) => EventKind::ObjectValueString,
            Event::ObjectValueNumber(_) => EventKind::ObjectValueNumber,
            Event::ObjectValueNull => EventKind::ObjectValueNull,
            Event::String(_) => EventKind::String,
            Event::Number(_) => EventKind::Number,
            Event::Null => EventKind::Null,
            Event::EndOfInput => EventKind::EndOfInput,
        }
    }

    /// See [`EventKind::context`].
    pub fn context(&self) -> Option<Context> {
        self.kind().context()
    }

    /// Takes the payload out of a key, string or number event.
    pub fn into_payload(self) -> Option<Payload<'p>> {
        match self {
            Event::ObjectKey(p)
            | Event::ArrayValueString(p)
            | Event::ArrayValueNumber(p)
            | Event::ObjectValueString(p)
            | Event::ObjectValueNumber(p)
            | Event::String(p)
            | Event::Number(p) => Some(p),
            _ => None,
        }
    }
}

/// Trait for parsers that can be used in a pull-based manner.
pub trait PullParser {
    /// Iterator-like method that returns None when parsing is complete.
    /// This method returns None when EndOfInput is reached, Some(Ok(event)) for successful events,
    /// and Some(Err(error)) for parsing errors.
    fn next(&mut self) -> Option<Result<Event<'_>, ParseError>> {
        match self.next_event() {
            Ok(Event::EndOfInput) => None,
            other => Some(other),
        }
    }
    /// Returns the next JSON event or an error if parsing fails.
    /// Parsing continues until `EndOfInput` is returned or an error occurs.
    fn next_event(&mut self) -> Result<Event<'_>, ParseError>;
}

/// A streaming, pull-based JSON parser over a [`Reader`].
///
/// The parser is a pushdown automaton: a stack of expectation frames says
/// which bytes may come next. Memory use is bounded by nesting depth, not by
/// document or value size, since scalar bytes are handed out through lazy
/// [`Payload`]s instead of being buffered.
///
/// A parser makes a single pass over its source. After [`Event::EndOfInput`]
/// it keeps returning `EndOfInput`; after an error it keeps returning that
/// error.
///
/// # Example
/// ```
/// use lazyjson::{ChunkReader, Event, EventKind, Parser};
///
/// let mut parser = Parser::new(ChunkReader::full_slice(br#"{"id": 7}"#));
/// assert_eq!(parser.next_event().unwrap().kind(), EventKind::ObjectOpen);
/// if let Event::ObjectKey(key) = parser.next_event().unwrap() {
///     assert_eq!(key.into_vec().unwrap(), b"id");
/// }
/// // Payloads left unread are drained automatically
/// assert_eq!(parser.next_event().unwrap().kind(), EventKind::ObjectValueNumber);
/// assert_eq!(parser.next_event().unwrap().kind(), EventKind::ObjectClose);
/// assert_eq!(parser.next_event().unwrap().kind(), EventKind::EndOfInput);
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    cursor: Cursor<R>,
    stack: Vec<Frame>,
    finished: bool,
}

impl<R: Reader> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            cursor: Cursor::new(reader),
            stack: vec![Matcher::END_OF_SOURCE.into(), Matcher::VALUE_START.into()],
            finished: false,
        }
    }

    /// Returns the next event.
    ///
    /// If the payload of the previous event was not read to the end, the
    /// rest of it is consumed first; grammar errors inside it are reported
    /// here.
    pub fn next_event(&mut self) -> Result<Event<'_>, ParseError> {
        if let Some(error) = self.cursor.failure() {
            return Err(error.clone());
        }
        if self.finished {
            return Ok(Event::EndOfInput);
        }
        if self.cursor.is_streaming() {
            log::debug!("draining unread payload at {}", self.cursor.lookahead.position());
            self.cursor.drain()?;
        }
        let kind = match self.advance() {
            Ok(kind) => kind,
            Err(error) => return Err(self.cursor.fail(error)),
        };
        log::trace!("event {kind:?}");
        Ok(self.event(kind))
    }

    /// Raw bytes read from the source so far.
    pub fn position(&self) -> usize {
        self.cursor.lookahead.position()
    }

    /// Returns the byte source. Its position is wherever parsing stopped,
    /// possibly with one byte held back in the parser's lookahead.
    pub fn into_inner(self) -> R {
        self.cursor.lookahead.into_inner()
    }

    fn event(&mut self, kind: EventKind) -> Event<'_> {
        match kind {
            EventKind::ObjectOpen => Event::ObjectOpen,
            EventKind::ObjectClose => Event::ObjectClose,
            EventKind::ArrayOpen => Event::ArrayOpen,
            EventKind::ArrayClose => Event::ArrayClose,
            EventKind::ObjectKey => Event::ObjectKey(Payload::new(&mut self.cursor)),
            EventKind::ArrayValueString => Event::ArrayValueString(Payload::new(&mut self.cursor)),
            EventKind::ArrayValueNumber => Event::ArrayValueNumber(Payload::new(&mut self.cursor)),
            EventKind::ArrayValueNull => Event::ArrayValueNull,
            EventKind::ObjectValueString => {
                Event::ObjectValueString(Payload::new(&mut self.cursor))
            }
            EventKind::ObjectValueNumber => {
                Event::ObjectValueNumber(Payload::new(&mut self.cursor))
            }
            EventKind::ObjectValueNull => Event::ObjectValueNull,
            EventKind::String => Event::String(Payload::new(&mut self.cursor)),
            EventKind::Number => Event::Number(Payload::new(&mut self.cursor)),
            EventKind::Null => Event::Null,
            EventKind::EndOfInput => Event::EndOfInput,
        }
    }

    /// Runs the automaton until the next event.
    fn advance(&mut self) -> Result<EventKind, ParseError> {
        loop {
            let frame = self.pop()?;
            let (input, matched) = self.expect(frame)?;
            log::trace!("{matched:?} matched {input:?}");
            match matched {
                Matcher::END_OF_SOURCE => {
                    self.finished = true;
                    return Ok(EventKind::EndOfInput);
                }
                Matcher::OBJECT_CLOSE => return Ok(EventKind::ObjectClose),
                Matcher::ARRAY_CLOSE => return Ok(EventKind::ArrayClose),
                Matcher::OBJECT_KEY_START => {
                    self.cursor.begin(ScalarState::String)?;
                    self.stack.push(Matcher::KV_SEP.into());
                    return Ok(EventKind::ObjectKey);
                }
                Matcher::KV_SEP => self.stack.push(Matcher::OBJECT_VALUE_START.into()),
                Matcher::NEXT_OBJECT_KEY_START => {
                    self.rearm(input, Matcher::OBJECT_KEY_START, matched)?;
                }
                Matcher::NEXT_ARRAY_VALUE_START => {
                    self.rearm(input, Matcher::ARRAY_VALUE_START, matched)?;
                }
                Matcher::VALUE_START => return self.value(input, Context::Root),
                Matcher::OBJECT_VALUE_START => return self.value(input, Context::Object),
                Matcher::ARRAY_VALUE_START => return self.value(input, Context::Array),
                _ => return Err(UnexpectedState::UnhandledMatcher.into()),
            }
        }
    }

    /// Reads the next non-whitespace byte and tests it against `frame`.
    ///
    /// For an alternation whose optional matcher accepts the byte, the
    /// mandatory remainder is pushed to be used next.
    fn expect(&mut self, frame: Frame) -> Result<(Input, Matcher), ParseError> {
        let input = self.cursor.lookahead.next_nonspace_byte()?;
        let mut frame = frame;
        loop {
            match frame {
                Frame::Alternation(optional, mandatory) => {
                    if optional.matches(input) {
                        self.stack.push(*mandatory);
                        return Ok((input, optional));
                    }
                    frame = *mandatory;
                }
                Frame::Single(matcher) if matcher.matches(input) => return Ok((input, matcher)),
                Frame::Single(_) => return Err(self.cursor.unexpected(input)),
            }
        }
    }

    /// After an item separator: expect another item, another separator, or
    /// whatever the container expected before.
    ///
    /// The next-item matchers also accept item starts; an item that follows
    /// the previous one without a `,` is a syntax error at its first byte.
    fn rearm(&mut self, input: Input, item: Matcher, separator: Matcher) -> Result<(), ParseError> {
        if input != Input::Byte(b',') {
            return Err(self.cursor.unexpected(input));
        }
        let previous = self.pop()?;
        self.stack
            .push(Frame::alternation(item, Frame::alternation(separator, previous)));
        Ok(())
    }

    fn value(&mut self, input: Input, context: Context) -> Result<EventKind, ParseError> {
        let Input::Byte(b) = input else {
            return Err(UnexpectedState::UnhandledMatcher.into());
        };
        let kind = match b {
            b'{' => {
                self.stack.push(Frame::alternation(
                    Matcher::OBJECT_KEY_START,
                    Frame::alternation(Matcher::NEXT_OBJECT_KEY_START, Matcher::OBJECT_CLOSE.into()),
                ));
                return Ok(EventKind::ObjectOpen);
            }
            b'[' => {
                self.stack.push(Frame::alternation(
                    Matcher::ARRAY_VALUE_START,
                    Frame::alternation(Matcher::NEXT_ARRAY_VALUE_START, Matcher::ARRAY_CLOSE.into()),
                ));
                return Ok(EventKind::ArrayOpen);
            }
            b'"' => {
                self.cursor.begin(ScalarState::String)?;
                EventKind::string(context)
            }
            b if Class::NumberStart.test(b) => {
                // The number payload starts with this byte
                self.cursor.lookahead.push_back(input)?;
                self.cursor.begin(ScalarState::Number(NumberPhase::Lead))?;
                EventKind::number(context)
            }
            b'n' => {
                self.expect_literal(b"ull")?;
                EventKind::null(context)
            }
            other => return Err(UnexpectedState::UnhandledValueStart(other).into()),
        };
        match context {
            Context::Array => {
                let previous = self.pop()?;
                self.stack
                    .push(Frame::alternation(Matcher::NEXT_ARRAY_VALUE_START, previous));
            }
            Context::Object => {
                let previous = self.pop()?;
                self.stack
                    .push(Frame::alternation(Matcher::NEXT_OBJECT_KEY_START, previous));
            }
            Context::Root => {}
        }
        Ok(kind)
    }

    /// Requires `rest` to follow immediately, with no whitespace.
    fn expect_literal(&mut self, rest: &[u8]) -> Result<(), ParseError> {
        for &expected in rest {
            let input = self.cursor.lookahead.next_byte()?;
            if input != Input::Byte(expected) {
                return Err(self.cursor.unexpected(input));
            }
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Frame, ParseError> {
        self.stack
            .pop()
            .ok_or(ParseError::Unexpected(UnexpectedState::EmptyExpectationStack))
    }

    /// Total number of matchers held on the expectation stack.
    #[cfg(test)]
    fn expectation_size(&self) -> usize {
        self.stack.iter().map(Frame::chain_len).sum()
    }
}

impl<R: Reader> PullParser for Parser<R> {
    fn next_event(&mut self) -> Result<Event<'_>, ParseError> {
        Parser::next_event(self)
    }
}
