// SPDX-License-Identifier: Apache-2.0

//! Byte classification and expectation frames.
//!
//! A [`Matcher`] tests the next non-whitespace [`Input`]. The engine keeps a
//! stack of [`Frame`]s; the top frame says what may come next. An
//! alternation frame first offers an optional matcher and otherwise falls
//! through to its mandatory remainder, which is how "zero or more
//! comma-separated items" is expressed without recursion.

use alloc::boxed::Box;

use crate::lookahead::Input;

/// Whitespace skipped between tokens: space, `\t`, `\n`, `\r`, `\x0b`, `\x0c`.
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Named byte predicates.
///
/// `ValueStart`, `ObjectValueStart` and `ArrayValueStart` accept the same
/// bytes. They are kept apart so the engine can tell from the matched class
/// which context a scalar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    NumberStart,
    ValueStart,
    ObjectValueStart,
    ArrayValueStart,
    NextObjectKeyStart,
    NextArrayValueStart,
}

impl Class {
    pub fn test(self, b: u8) -> bool {
        match self {
            Class::NumberStart => b == b'-' || b.is_ascii_digit(),
            Class::ValueStart | Class::ObjectValueStart | Class::ArrayValueStart => {
                matches!(b, b'{' | b'[' | b'"' | b'n') || Class::NumberStart.test(b)
            }
            Class::NextObjectKeyStart => b == b',' || b == b'"',
            Class::NextArrayValueStart => b == b',' || Class::ArrayValueStart.test(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Matcher {
    Exact(u8),
    Class(Class),
    EndOfSource,
}

impl Matcher {
    pub const END_OF_SOURCE: Matcher = Matcher::EndOfSource;
    pub const OBJECT_CLOSE: Matcher = Matcher::Exact(b'}');
    pub const ARRAY_CLOSE: Matcher = Matcher::Exact(b']');
    pub const OBJECT_KEY_START: Matcher = Matcher::Exact(b'"');
    pub const KV_SEP: Matcher = Matcher::Exact(b':');
    pub const VALUE_START: Matcher = Matcher::Class(Class::ValueStart);
    pub const OBJECT_VALUE_START: Matcher = Matcher::Class(Class::ObjectValueStart);
    pub const ARRAY_VALUE_START: Matcher = Matcher::Class(Class::ArrayValueStart);
    pub const NEXT_OBJECT_KEY_START: Matcher = Matcher::Class(Class::NextObjectKeyStart);
    pub const NEXT_ARRAY_VALUE_START: Matcher = Matcher::Class(Class::NextArrayValueStart);

    pub fn matches(self, input: Input) -> bool {
        match (self, input) {
            (Matcher::EndOfSource, Input::EndOfSource) => true,
            (Matcher::Exact(expected), Input::Byte(b)) => expected == b,
            (Matcher::Class(class), Input::Byte(b)) => class.test(b),
            _ => false,
        }
    }
}

/// One entry of the expectation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    Single(Matcher),
    /// `(optional, mandatory)`: try `optional`; if it matches, `mandatory`
    /// becomes the next frame, otherwise test `mandatory` right away.
    Alternation(Matcher, Box<Frame>),
}

impl Frame {
    /// Builds `(optional, mandatory)`.
    ///
    /// If `mandatory` already offers `optional` first, the outer test could
    /// never succeed where the inner one fails, so `mandatory` is returned
    /// as is. This keeps frames from growing with every element of a long
    /// array or object.
    pub fn alternation(optional: Matcher, mandatory: Frame) -> Frame {
        match mandatory {
            Frame::Alternation(inner, _) if inner == optional => mandatory,
            _ => Frame::Alternation(optional, Box::new(mandatory)),
        }
    }

    /// Number of matchers chained in this frame.
    #[cfg(test)]
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut frame = self;
        while let Frame::Alternation(_, rest) = frame {
            len += 1;
            frame = rest;
        }
        len
    }
}

impl From<Matcher> for Frame {
    fn from(matcher: Matcher) -> Self {
        Frame::Single(matcher)
    }
}
