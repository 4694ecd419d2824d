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

//! Pull-based streaming XML event parser.
//!
//! This crate turns the chunk-fed, callback-driven `xeven-core` tokenizer
//! into a demand-driven sequence of logical [`XmlEvent`]s, consumable one
//! at a time. It is built for sources a caller cannot (or does not want
//! to) drive with callbacks: in-memory buffers, files, and live network
//! streams that may be slow, may stall, and may die mid-transfer.
//!
//! # Features
//!
//! - **Demand-driven**: bytes are read only when the next event is asked
//!   for, one fixed-size chunk at a time
//! - **Maximal text events**: character-data fragments produced by
//!   chunking are merged before delivery, never exposed to the caller
//! - **Truncation-aware errors**: a stream that dies mid-transfer is
//!   reported as a retryable [`StreamError::Truncated`], distinct from a
//!   genuinely malformed document
//! - **Capability-based sources**: anything implementing [`ByteSource`]
//!   works, whether or not it can see its own end without reading
//!
//! # Basic Usage
//!
//! ```rust
//! use xeven_stream::{XmlEvent, XmlPullParser};
//!
//! let mut parser = XmlPullParser::from_str("<doc><item>one</item></doc>");
//!
//! while parser.has_next() {
//!     match parser.next_event().unwrap() {
//!         XmlEvent::StartElement { name, .. } => println!("start {name}"),
//!         XmlEvent::Text { content, .. } => println!("text {content}"),
//!         XmlEvent::EndElement { name, .. } => println!("end {name}"),
//!         XmlEvent::EndDocument => println!("end of document"),
//!     }
//! }
//! ```
//!
//! # Streaming from a reader
//!
//! Wrap any [`std::io::Read`] in a [`ReadSource`]; the parser borrows the
//! source for its lifetime, so the caller keeps ownership:
//!
//! ```rust
//! use std::io::Cursor;
//! use xeven_stream::{ReadSource, XmlPullParser};
//!
//! let body = Cursor::new(b"<r><v>42</v></r>".to_vec());
//! let mut source = ReadSource::new(body);
//! let parser = XmlPullParser::new(&mut source);
//!
//! for event in parser {
//!     // process one logical unit at a time
//!     assert!(event.is_ok());
//! }
//! ```
//!
//! # Handling truncation
//!
//! ```rust
//! use xeven_stream::{StreamError, XmlPullParser};
//!
//! let mut parser = XmlPullParser::from_str("<list><item>first</item><item>sec");
//! let mut err = None;
//! while parser.has_next() {
//!     match parser.next_event() {
//!         Ok(_) => {}
//!         Err(e) => {
//!             err = Some(e);
//!             break;
//!         }
//!     }
//! }
//! // The stream ended mid-document: retry the fetch, not the parse.
//! assert!(err.unwrap().is_retryable());
//! ```

mod error;
mod event;
mod parser;
mod source;

pub use error::{StreamError, StreamResult};
pub use event::XmlEvent;
pub use parser::XmlPullParser;
pub use source::{ByteSource, MemorySource, ReadSource};

/// Re-export core types for convenience.
pub use xeven_core::{Attribute, Position};
