// Dweve XEVEN - Streaming XML Event Parser
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The pull parser.
//!
//! [`XmlPullParser`] turns the push-based tokenizer engine into a
//! demand-driven sequence of [`XmlEvent`]s: the caller asks for the next
//! logical unit, and the parser reads exactly as much of the byte source as
//! it takes to produce one. Nothing is read ahead of demand beyond the
//! current chunk, which makes the parser usable over live streams that
//! produce bytes slowly or may stop producing them at all.
//!
//! # How an event is produced
//!
//! When the internal queue is empty, the parser reads one fixed-size chunk
//! from its source and feeds it to the engine; the engine's callbacks push
//! zero or more events onto the queue (a chunk of pure whitespace between
//! tags produces none, so the loop repeats until something arrives). Text
//! fragments are then coalesced: the parser keeps pulling raw events while
//! they are text, merging them, and pushes the first non-text event back
//! onto the front of the queue. A single pushback slot is all this needs —
//! coalescing stops at the first structural boundary.
//!
//! # Truncation vs. malformation
//!
//! A stream that dies mid-transfer hands the engine a final chunk that ends
//! with elements still open — the engine reports "no element found", the
//! same failure an empty document produces. That case is surfaced as
//! [`StreamError::Truncated`] with a retry hint, because the document at
//! the origin may be perfectly fine; every other engine failure is a
//! [`StreamError::Malformed`] with the engine's exact position.
//!
//! # Examples
//!
//! ```
//! use xeven_stream::{XmlEvent, XmlPullParser};
//!
//! let mut parser = XmlPullParser::from_str("<greeting kind=\"warm\">hello</greeting>");
//!
//! while parser.has_next() {
//!     match parser.next_event().unwrap() {
//!         XmlEvent::StartElement { name, .. } => println!("<{name}>"),
//!         XmlEvent::Text { content, .. } => println!("{content}"),
//!         XmlEvent::EndElement { name, .. } => println!("</{name}>"),
//!         XmlEvent::EndDocument => println!("done"),
//!     }
//! }
//! ```
//!
//! Parsing from a live reader, borrowing the source:
//!
//! ```
//! use std::io::Cursor;
//! use xeven_stream::{ReadSource, XmlEvent, XmlPullParser};
//!
//! let mut source = ReadSource::new(Cursor::new(b"<a>x</a>".to_vec()));
//! let mut parser = XmlPullParser::new(&mut source);
//! let events: Vec<XmlEvent> = parser.by_ref().collect::<Result<_, _>>().unwrap();
//! assert_eq!(events.len(), 3);
//! ```

use crate::error::{StreamError, StreamResult};
use crate::event::XmlEvent;
use crate::source::{ByteSource, MemorySource};
use std::collections::VecDeque;
use xeven_core::{Attribute, Position, TokenSink, TokenizeError, Tokenizer};

/// Bytes requested from the source per feed-loop iteration.
const CHUNK_SIZE: usize = 512;

/// Pull-based XML event parser.
///
/// Bound to exactly one byte source and one document for its whole life:
/// after [`XmlEvent::EndDocument`] has been returned the parser is
/// finished, and further pulls fail with [`StreamError::Finished`]. The
/// source may be owned or borrowed (`&mut S` is itself a [`ByteSource`]);
/// either way the parser has exclusive use of it.
///
/// Not safe for concurrent use; callers needing that must serialize
/// externally.
#[derive(Debug)]
pub struct XmlPullParser<S: ByteSource> {
    source: S,
    tokenizer: Tokenizer,
    events: VecDeque<XmlEvent>,
    finished: bool,
}

/// Adapter from the engine's callbacks onto the event queue. This is the
/// whole callback-to-pull inversion: callbacks append, pulls pop.
struct QueueSink<'a> {
    events: &'a mut VecDeque<XmlEvent>,
}

impl TokenSink for QueueSink<'_> {
    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, pos: Position) {
        self.events.push_back(XmlEvent::StartElement {
            name,
            attributes,
            position: pos,
        });
    }

    fn end_element(&mut self, name: String, pos: Position) {
        self.events.push_back(XmlEvent::EndElement {
            name,
            position: pos,
        });
    }

    fn characters(&mut self, text: String, pos: Position) {
        self.events.push_back(XmlEvent::Text {
            content: text,
            position: pos,
        });
    }

    // Comments and processing instructions are not logical events of this
    // layer; the default no-op callbacks discard them.
}

impl XmlPullParser<MemorySource> {
    /// Convenience constructor over raw text, wrapped in an owned
    /// in-memory source.
    pub fn from_str(text: &str) -> Self {
        Self::new(MemorySource::from(text))
    }
}

impl<S: ByteSource> XmlPullParser<S> {
    /// Creates a parser over `source` with the engine's default encoding
    /// handling (UTF-8 unless the document declares otherwise).
    pub fn new(source: S) -> Self {
        Self {
            source,
            tokenizer: Tokenizer::new(),
            events: VecDeque::new(),
            finished: false,
        }
    }

    /// Creates a parser with a caller-chosen encoding, which overrides
    /// whatever the document declares.
    ///
    /// Fails with [`StreamError::UnsupportedEncoding`] before any byte is
    /// read if the engine cannot be created for `encoding`.
    pub fn with_encoding(source: S, encoding: &str) -> StreamResult<Self> {
        let tokenizer = Tokenizer::with_encoding(encoding)
            .map_err(|_| StreamError::UnsupportedEncoding(encoding.to_string()))?;
        Ok(Self {
            source,
            tokenizer,
            events: VecDeque::new(),
            finished: false,
        })
    }

    /// True until the terminal [`XmlEvent::EndDocument`] has been
    /// retrieved.
    #[inline]
    pub fn has_next(&self) -> bool {
        !self.finished
    }

    /// Returns the next logical event.
    ///
    /// Reads from the source as needed. Text events are always maximal:
    /// adjacent fragments produced by chunking are merged before delivery,
    /// and the merged event keeps the position of its first fragment.
    ///
    /// # Errors
    ///
    /// [`StreamError::Finished`] after the terminal event was retrieved;
    /// [`StreamError::Truncated`] when the stream ends mid-document;
    /// [`StreamError::Malformed`] for well-formedness violations;
    /// [`StreamError::Io`] when the source fails. An error leaves the
    /// parser's queue and finished flag untouched.
    pub fn next_event(&mut self) -> StreamResult<XmlEvent> {
        let mut event = self.next_raw_event()?;
        if event.is_text() {
            self.coalesce_text(&mut event)?;
        }
        if event.is_end_document() {
            self.finished = true;
        }
        Ok(event)
    }

    /// Merges every immediately following text fragment into `first`,
    /// pushing the first non-text event back onto the queue front. One
    /// pushback slot suffices: coalescing is not recursive beyond this
    /// adjacency.
    fn coalesce_text(&mut self, first: &mut XmlEvent) -> StreamResult<()> {
        loop {
            match self.next_raw_event()? {
                XmlEvent::Text { content, .. } => {
                    if let XmlEvent::Text { content: merged, .. } = first {
                        merged.push_str(&content);
                    }
                }
                other => {
                    self.events.push_front(other);
                    return Ok(());
                }
            }
        }
    }

    /// The feed loop: produces the next event in undistorted document
    /// order, reading and feeding chunks until one is available.
    fn next_raw_event(&mut self) -> StreamResult<XmlEvent> {
        if self.finished {
            return Err(StreamError::Finished);
        }
        while self.events.is_empty() {
            if self.source.is_exhausted() {
                // No bytes left and no terminal event was ever produced:
                // the caller is pulling past a document that never ended.
                return Err(StreamError::PastEnd);
            }
            let mut chunk = [0u8; CHUNK_SIZE];
            let len = self.source.read(&mut chunk)?;
            // Exhaustion may only have become known through the read.
            let is_last = self.source.is_exhausted();
            let mut sink = QueueSink {
                events: &mut self.events,
            };
            if let Err(err) = self.tokenizer.feed(&chunk[..len], is_last, &mut sink) {
                return Err(classify(err, is_last));
            }
            if is_last {
                self.events.push_back(XmlEvent::EndDocument);
            }
        }
        // Safe: the loop above only exits when the queue is non-empty.
        Ok(self.events.pop_front().expect("event queue is non-empty"))
    }
}

/// Maps an engine failure onto the caller-facing taxonomy.
///
/// "No element found" on the final chunk is the signature of a stream that
/// closed before the document finished; everything else is the document's
/// own fault and keeps the engine's position.
fn classify(err: TokenizeError, is_last: bool) -> StreamError {
    if is_last && err.is_no_elements() {
        StreamError::truncated(
            "the data stream ended before the XML parser could parse everything; \
             this can happen if the network connection terminates before all the \
             data has been received",
        )
    } else {
        StreamError::malformed(
            err.position.line(),
            err.position.column(),
            err.kind.to_string(),
        )
    }
}

/// Yields events in order, ending after the terminal event: the
/// `EndDocument` marker maps to iterator exhaustion. Use
/// [`next_event`](XmlPullParser::next_event) directly to observe the
/// terminal event itself.
impl<S: ByteSource> Iterator for XmlPullParser<S> {
    type Item = StreamResult<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_event() {
            Ok(XmlEvent::EndDocument) => None,
            Ok(event) => Some(Ok(event)),
            Err(e) => Some(Err(e)),
        }
    }
}
