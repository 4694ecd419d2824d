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

//! The structural callback interface of the tokenizer.
//!
//! A [`TokenSink`] is handed to every [`feed`](crate::Tokenizer::feed) call
//! and receives the constructs found in that chunk, synchronously and in
//! document order. Callbacks a consumer does not care about have default
//! empty bodies, so a sink implements only what it wants to observe —
//! anything else is discarded by the engine.
//!
//! # Examples
//!
//! ```
//! use xeven_core::{Attribute, Position, TokenSink, Tokenizer};
//!
//! #[derive(Default)]
//! struct NameCollector(Vec<String>);
//!
//! impl TokenSink for NameCollector {
//!     fn start_element(&mut self, name: String, _attrs: Vec<Attribute>, _pos: Position) {
//!         self.0.push(name);
//!     }
//!     fn end_element(&mut self, _name: String, _pos: Position) {}
//!     fn characters(&mut self, _text: String, _pos: Position) {}
//! }
//!
//! let mut names = NameCollector::default();
//! let mut tokenizer = Tokenizer::new();
//! tokenizer.feed(b"<a><b/></a>", true, &mut names).unwrap();
//! assert_eq!(names.0, vec!["a", "b"]);
//! ```

use crate::position::Position;

/// One attribute of a start tag, in written order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written.
    pub name: String,
    /// Attribute value, entity-decoded and whitespace-normalized.
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute.
    #[inline]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receiver for the tokenizer's structural callbacks.
///
/// `start_element`, `end_element`, and `characters` are the structural core
/// and must be implemented. `comment` and `processing_instruction` default
/// to doing nothing.
pub trait TokenSink {
    /// A start tag, or the opening half of an empty-element tag.
    ///
    /// An empty-element tag (`<a/>`) produces a `start_element` immediately
    /// followed by an `end_element` at the same position.
    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, pos: Position);

    /// An end tag, or the closing half of an empty-element tag.
    fn end_element(&mut self, name: String, pos: Position);

    /// A run of character data inside the root element.
    ///
    /// One logical text run may arrive as several fragments when it crosses
    /// chunk boundaries; the position is that of the fragment's first
    /// character. CDATA section content is reported here as well.
    fn characters(&mut self, text: String, pos: Position);

    /// A comment. Discarded by default.
    fn comment(&mut self, _text: String, _pos: Position) {}

    /// A processing instruction. Discarded by default.
    fn processing_instruction(&mut self, _target: String, _data: Option<String>, _pos: Position) {}
}
