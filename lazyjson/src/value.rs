// SPDX-License-Identifier: Apache-2.0

//! Owned JSON values and conversion of scalar events.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use bstr::{BStr, BString, ByteSlice};

use crate::parse_error::ParseError;
use crate::stream_parser::Event;

/// Object members keyed by raw key bytes.
pub type Map = BTreeMap<BString, Value>;

/// A JSON value.
///
/// Strings are kept as raw bytes exactly as they appear between the quotes;
/// escapes are not processed and no UTF-8 validation is done.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    String(BString),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Converts a scalar event into a value, reading its payload to the end.
    ///
    /// Returns `Ok(None)` for container and key events.
    pub fn from_event(event: Event<'_>) -> Result<Option<Value>, ParseError> {
        let value = match event {
            Event::Null | Event::ArrayValueNull | Event::ObjectValueNull => Value::Null,
            Event::String(p) | Event::ArrayValueString(p) | Event::ObjectValueString(p) => {
                Value::String(p.into_vec()?.into())
            }
            Event::Number(p) | Event::ArrayValueNumber(p) | Event::ObjectValueNumber(p) => {
                Value::Number(parse_number(&p.into_vec()?)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bstr(&self) -> Option<&BStr> {
        match self {
            Value::String(s) => Some(s.as_bstr()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up an object member.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_object()?.get(key.as_ref().as_bstr())
    }
}

/// Parses the bytes of a numeric payload as a decimal float.
///
/// The payload grammar admits a lone `-`, which is rejected here.
pub(crate) fn parse_number(bytes: &[u8]) -> Result<f64, ParseError> {
    core::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or(ParseError::InvalidNumber)
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<&[u8]> for Value {
    fn from(s: &[u8]) -> Self {
        Value::String(s.into())
    }
}

impl From<BString> for Value {
    fn from(s: BString) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

fn write_string(f: &mut core::fmt::Formatter<'_>, s: &BStr) -> core::fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Renders the value in JSON notation for logs and diagnostics. Invalid
/// UTF-8 in strings is shown as U+FFFD, and `"` and `\\` are escaped.
///
/// This is not an encoder: the parser does not process escapes, so a string
/// containing `"` or `\\` does not read back as the same value.
impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_string(f, s.as_bstr()),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_string(f, key.as_bstr())?;
                    write!(f, ":{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
