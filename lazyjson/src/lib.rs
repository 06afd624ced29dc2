// SPDX-License-Identifier: Apache-2.0

//! A constant-memory, event-driven JSON reader.
//!
//! [`Parser`] pulls bytes from a [`Reader`] one at a time and turns them into
//! [`Event`]s. String and number events carry a lazy [`Payload`] instead of
//! their bytes, so memory use depends on nesting depth only. On top of the
//! event stream sit [`extract`], which picks scalars by [`Path`], and
//! [`load`], which builds a whole [`Value`].
//!
//! [`Utf8Decoder`] is independent of the parser: it decodes any byte source,
//! including a string [`Payload`], with a configurable [`ErrorPolicy`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod builder;
mod extractor;
mod lookahead;
mod matcher;
mod parse_error;
mod payload;
mod reader;
mod stream_parser;
mod utf8_decoder;
mod value;

pub use builder::{load, load_slice};
pub use extractor::{extract, Extract, Path, PathItem};
pub use lookahead::Input;
pub use parse_error::{ParseError, UnexpectedState};
pub use payload::Payload;
#[cfg(feature = "std")]
pub use reader::IoReader;
pub use reader::{ChunkReader, Reader};
pub use stream_parser::{Context, Event, EventKind, Parser, PullParser};
pub use utf8_decoder::{ErrorPolicy, Utf8Decoder};
pub use value::{Map, Value};

// Re-exports for the `path!` macro
#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
}
