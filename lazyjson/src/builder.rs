// SPDX-License-Identifier: Apache-2.0

//! Building a whole [`Value`] tree from the event stream.

use alloc::vec::Vec;

use bstr::BString;

use crate::parse_error::{ParseError, UnexpectedState};
use crate::reader::ChunkReader;
use crate::stream_parser::{Context, Event, Parser};
use crate::value::{Map, Value};
use crate::Reader;

/// A container still being filled.
#[derive(Debug)]
enum Open {
    Array(Vec<Value>),
    /// Members so far, and the key waiting for its value.
    Object(Map, Option<BString>),
}

impl Open {
    fn into_value(self) -> Value {
        match self {
            Open::Array(items) => Value::Array(items),
            Open::Object(map, _) => Value::Object(map),
        }
    }
}

/// Stack of open containers, innermost last.
///
/// A container is attached to its parent when it closes.
#[derive(Debug, Default)]
struct Builder {
    open: Vec<Open>,
}

impl Builder {
    fn set_key(&mut self, key: BString) -> Result<(), ParseError> {
        match self.open.last_mut() {
            Some(Open::Object(_, pending)) => {
                *pending = Some(key);
                Ok(())
            }
            _ => Err(UnexpectedState::MissingObjectKey.into()),
        }
    }

    /// Adds `value` to the innermost container. With nothing open, `value`
    /// is the finished document and is handed back.
    fn attach(&mut self, value: Value) -> Result<Option<Value>, ParseError> {
        match self.open.last_mut() {
            None => Ok(Some(value)),
            Some(Open::Array(items)) => {
                items.push(value);
                Ok(None)
            }
            Some(Open::Object(map, pending)) => {
                let key = pending.take().ok_or(UnexpectedState::MissingObjectKey)?;
                // A repeated key keeps the last value
                map.insert(key, value);
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<Option<Value>, ParseError> {
        let container = self.open.pop().ok_or(UnexpectedState::UnbalancedClose)?;
        self.attach(container.into_value())
    }
}

/// Reads one complete document from `reader`.
///
/// Reading stops right after the value that makes up the document: the
/// closing bracket of the root container, or the end of a root scalar.
/// Whatever follows is not examined.
///
/// ```
/// use lazyjson::{load, ChunkReader, Value};
///
/// let value = load(ChunkReader::new(br#"{"a": [1, null]}"#, 4)).unwrap();
/// assert_eq!(value.get("a").and_then(|a| a.as_array()).map(|a| a.len()), Some(2));
/// assert_eq!(load(ChunkReader::full_slice(b"42")).unwrap(), Value::Number(42.0));
/// ```
pub fn load<R: Reader>(reader: R) -> Result<Value, ParseError> {
    let mut parser = Parser::new(reader);
    let mut builder = Builder::default();
    loop {
        let event = parser.next_event()?;
        let done = match event {
            Event::ObjectOpen => {
                builder.open.push(Open::Object(Map::new(), None));
                None
            }
            Event::ArrayOpen => {
                builder.open.push(Open::Array(Vec::new()));
                None
            }
            Event::ObjectClose | Event::ArrayClose => builder.close()?,
            Event::ObjectKey(key) => {
                builder.set_key(key.into_vec()?.into())?;
                None
            }
            Event::EndOfInput => return Err(UnexpectedState::TruncatedEventStream.into()),
            scalar => {
                let root = scalar.context() == Some(Context::Root);
                match Value::from_event(scalar)? {
                    Some(value) if root => Some(value),
                    Some(value) => builder.attach(value)?,
                    None => None,
                }
            }
        };
        if let Some(value) = done {
            return Ok(value);
        }
    }
}

/// [`load`] over an in-memory document.
pub fn load_slice(json: &[u8]) -> Result<Value, ParseError> {
    load(ChunkReader::full_slice(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookahead::Input;
    use alloc::vec;
    use test_log::test;

    fn object(members: &[(&str, Value)]) -> Value {
        Value::Object(
            members
                .iter()
                .map(|(k, v)| (BString::from(*k), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_scalars() {
        assert_eq!(load_slice(b"null"), Ok(Value::Null));
        assert_eq!(load_slice(b"42"), Ok(Value::Number(42.0)));
        assert_eq!(load_slice(b" \"s\" "), Ok(Value::from("s")));
    }

    #[test]
    fn test_flat_containers() {
        assert_eq!(
            load_slice(br#"{"a":1,"b":2}"#),
            Ok(object(&[("a", 1.0.into()), ("b", 2.0.into())]))
        );
        assert_eq!(
            load_slice(b"[1,2,3]"),
            Ok(Value::from(vec![1.0.into(), 2.0.into(), 3.0.into()]))
        );
        assert_eq!(load_slice(b"[]"), Ok(Value::Array(vec![])));
        assert_eq!(load_slice(b"{}"), Ok(Value::Object(Map::new())));
    }

    #[test]
    fn test_nested() {
        let value = load_slice(br#"{"a": [1, {"b": null, "c": [[]]}], "d": "e"}"#).unwrap();
        let expected = object(&[
            (
                "a",
                Value::from(vec![
                    1.0.into(),
                    object(&[("b", Value::Null), ("c", Value::from(vec![Value::Array(vec![])]))]),
                ]),
            ),
            ("d", "e".into()),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_separator_tolerance() {
        assert_eq!(
            load_slice(b"[1,,2,]"),
            Ok(Value::from(vec![1.0.into(), 2.0.into()]))
        );
        assert_eq!(
            load_slice(br#"{"a":1,,"b":2,}"#),
            Ok(object(&[("a", 1.0.into()), ("b", 2.0.into())]))
        );
    }

    #[test]
    fn test_duplicate_key_keeps_last() {
        assert_eq!(load_slice(br#"{"k":1,"k":2}"#), Ok(object(&[("k", 2.0.into())])));
    }

    #[test]
    fn test_trailing_input_is_not_read() {
        assert_eq!(load_slice(b"[1] ]]] not json"), Ok(Value::from(vec![1.0.into()])));

        let mut reader = ChunkReader::new(b"{}{}", 1);
        assert_eq!(load(&mut reader), Ok(Value::Object(Map::new())));
        assert_eq!(reader.consumed(), 2);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            load_slice(br#"{"a":}"#),
            Err(ParseError::UnexpectedCharacter {
                found: Input::Byte(b'}'),
                position: 6
            })
        );
        assert!(load_slice(b"[1, 2").is_err());
        assert_eq!(load_slice(b"[-]"), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_builder_invariants() {
        let mut builder = Builder::default();
        assert_eq!(
            builder.close(),
            Err(ParseError::Unexpected(UnexpectedState::UnbalancedClose))
        );
        assert_eq!(
            builder.set_key("k".into()),
            Err(ParseError::Unexpected(UnexpectedState::MissingObjectKey))
        );
        builder.open.push(Open::Object(Map::new(), None));
        assert_eq!(
            builder.attach(Value::Null),
            Err(ParseError::Unexpected(UnexpectedState::MissingObjectKey))
        );
    }
}
