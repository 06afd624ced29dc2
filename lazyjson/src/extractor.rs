// SPDX-License-Identifier: Apache-2.0

//! Pulling selected scalars out of a document by path.
//!
//! [`extract`] follows the event stream while keeping track of where in the
//! document it is, and converts only the scalars that sit at one of the
//! requested paths. Once every path has been found it stops reading, so
//! anything after the last requested value is never looked at.

use alloc::vec::Vec;

use bstr::BString;

use crate::parse_error::ParseError;
use crate::stream_parser::{Context, Event, Parser};
use crate::value::Value;
use crate::Reader;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathItem {
    /// Object member, by raw key bytes.
    Key(BString),
    /// Array element, zero-based.
    Index(usize),
}

/// Address of a value: keys and indices from the root down.
pub type Path = Vec<PathItem>;

impl From<&str> for PathItem {
    fn from(key: &str) -> Self {
        PathItem::Key(key.into())
    }
}

impl From<&[u8]> for PathItem {
    fn from(key: &[u8]) -> Self {
        PathItem::Key(key.into())
    }
}

impl From<BString> for PathItem {
    fn from(key: BString) -> Self {
        PathItem::Key(key)
    }
}

impl From<usize> for PathItem {
    fn from(index: usize) -> Self {
        PathItem::Index(index)
    }
}

/// Builds a [`Path`] from keys and indices.
///
/// ```
/// use lazyjson::{path, PathItem};
///
/// let p = path!["users", 0, "name"];
/// assert_eq!(p[1], PathItem::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    ($($item:expr),* $(,)?) => {
        $crate::__private::vec![$($crate::PathItem::from($item)),*]
    };
}

/// Position inside one open container.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Object whose next key has not been seen yet.
    PendingKey,
    Key(BString),
    /// Array element; `None` before the first element.
    Index(Option<usize>),
}

impl Segment {
    fn advance(&mut self) {
        if let Segment::Index(index) = self {
            *index = Some(index.map_or(0, |i| i + 1));
        }
    }

    fn matches(&self, item: &PathItem) -> bool {
        match (self, item) {
            (Segment::Key(key), PathItem::Key(wanted)) => key == wanted,
            (Segment::Index(Some(index)), PathItem::Index(wanted)) => index == wanted,
            _ => false,
        }
    }
}

/// Index of the first path in `paths` that names `location`.
fn find(paths: &[Path], location: &[Segment]) -> Option<usize> {
    paths.iter().position(|path| {
        path.len() == location.len()
            && location
                .iter()
                .zip(path)
                .all(|(segment, item)| segment.matches(item))
    })
}

/// Iterator returned by [`extract`].
#[derive(Debug)]
pub struct Extract<R> {
    parser: Parser<R>,
    location: Vec<Segment>,
    /// Requested paths not found yet, in request order.
    outstanding: Vec<Path>,
    done: bool,
}

/// Streams `(path, value)` pairs for the scalars at `paths`, in document
/// order.
///
/// Paths that lead to a container or to nothing are never yielded. A path
/// requested more than once is yielded once. The iterator ends as soon as
/// every path has been found, without reading the rest of the input, or at
/// the end of the document. A parse error is yielded once and ends the
/// iteration.
///
/// ```
/// use lazyjson::{extract, path, ChunkReader, Value};
///
/// let json = br#"{"a": [1, {"b": 2}]} this is never read"#;
/// let found: Vec<_> = extract(ChunkReader::full_slice(json), [path!["a", 1, "b"]])
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(found, vec![(path!["a", 1, "b"], Value::Number(2.0))]);
/// ```
pub fn extract<R, I>(reader: R, paths: I) -> Extract<R>
where
    R: Reader,
    I: IntoIterator<Item = Path>,
{
    let mut outstanding: Vec<Path> = Vec::new();
    for path in paths {
        if !outstanding.contains(&path) {
            outstanding.push(path);
        }
    }
    Extract {
        parser: Parser::new(reader),
        location: Vec::new(),
        outstanding,
        done: false,
    }
}

impl<R: Reader> Extract<R> {
    /// Paths not found so far.
    pub fn outstanding(&self) -> &[Path] {
        &self.outstanding
    }

    pub fn into_parser(self) -> Parser<R> {
        self.parser
    }

    fn advance(&mut self) -> Result<Option<(Path, Value)>, ParseError> {
        loop {
            let event = self.parser.next_event()?;
            match event {
                Event::ObjectOpen => {
                    if let Some(parent) = self.location.last_mut() {
                        parent.advance();
                    }
                    self.location.push(Segment::PendingKey);
                }
                Event::ArrayOpen => {
                    if let Some(parent) = self.location.last_mut() {
                        parent.advance();
                    }
                    self.location.push(Segment::Index(None));
                }
                Event::ObjectClose | Event::ArrayClose => {
                    self.location.pop();
                }
                Event::ObjectKey(key) => {
                    let key = BString::from(key.into_vec()?);
                    if let Some(top) = self.location.last_mut() {
                        *top = Segment::Key(key);
                    }
                }
                Event::EndOfInput => return Ok(None),
                scalar => {
                    if scalar.context() == Some(Context::Array) {
                        if let Some(top) = self.location.last_mut() {
                            top.advance();
                        }
                    }
                    let Some(found) = find(&self.outstanding, &self.location) else {
                        continue;
                    };
                    let Some(value) = Value::from_event(scalar)? else {
                        continue;
                    };
                    let path = self.outstanding.remove(found);
                    log::trace!("found {path:?}");
                    return Ok(Some((path, value)));
                }
            }
        }
    }
}

impl<R: Reader> Iterator for Extract<R> {
    type Item = Result<(Path, Value), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.outstanding.is_empty() {
            return None;
        }
        match self.advance() {
            Ok(Some(found)) => Some(Ok(found)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl<R: Reader> core::iter::FusedIterator for Extract<R> {}
