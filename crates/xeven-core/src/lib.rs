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

//! Chunk-fed streaming XML tokenizer engine.
//!
//! This crate is the push half of XEVEN: a tokenizer that accepts the
//! document as a sequence of byte chunks and reports structure through
//! synchronous [`TokenSink`] callbacks. It performs well-formedness
//! checking, tracks line/column positions for every construct and error,
//! decodes the predefined entities and character references, and handles
//! UTF-8, US-ASCII, and ISO-8859-1 input.
//!
//! The pull-style consumer API lives in the companion `xeven-stream`
//! crate, which adapts these callbacks into a demand-driven event
//! sequence. Use this crate directly when a callback interface is what
//! you want, or when you need to drive the tokenizer from your own I/O
//! loop.
//!
//! # Features
//!
//! - **Chunk-agnostic**: constructs split across chunk boundaries (tags,
//!   entity references, multi-byte characters) are carried over and
//!   reported once complete
//! - **Synchronous callbacks**: every complete construct is delivered
//!   before `feed` returns, in document order
//! - **Positioned errors**: every failure carries the line and column the
//!   scan had reached
//! - **No DTD processing**: DOCTYPE declarations are skipped, undeclared
//!   entities are errors

mod encoding;
mod entities;
mod error;
mod position;
mod sink;
mod tokenizer;

pub use encoding::{incomplete_utf8_tail, Encoding};
pub use entities::{decode as decode_entities, is_valid_xml_char, EntityError};
pub use error::{TokenizeError, TokenizeErrorKind, TokenizeResult};
pub use position::Position;
pub use sink::{Attribute, TokenSink};
pub use tokenizer::Tokenizer;
