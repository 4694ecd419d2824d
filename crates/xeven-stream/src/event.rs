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

//! The logical events delivered by the pull parser.
//!
//! An [`XmlEvent`] is a post-coalescing unit: a `Text` event always carries
//! the maximal contiguous run of character data between two structural
//! boundaries, never a fragment produced by the engine's internal chunking.
//! Exactly one `EndDocument` closes every successful parse.
//!
//! # Example event sequence
//!
//! For the document `<a><b>x</b>y</a>` the parser yields:
//!
//! ```text
//! StartElement { name: "a", .. }
//! StartElement { name: "b", .. }
//! Text { content: "x", .. }
//! EndElement { name: "b", .. }
//! Text { content: "y", .. }
//! EndElement { name: "a", .. }
//! EndDocument
//! ```

use xeven_core::{Attribute, Position};

/// One logical unit of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// A start tag (or the opening half of an empty-element tag).
    StartElement {
        /// Element name as written.
        name: String,
        /// Attributes in written order.
        attributes: Vec<Attribute>,
        /// Position of the tag's `<`.
        position: Position,
    },

    /// An end tag (or the closing half of an empty-element tag).
    EndElement {
        /// Element name as written.
        name: String,
        /// Position of the tag's `<`.
        position: Position,
    },

    /// A maximal run of character data.
    Text {
        /// Decoded content; when fragments were merged, all of them.
        content: String,
        /// Position of the first character of the first fragment.
        position: Position,
    },

    /// The terminal event: delivered exactly once, always last.
    EndDocument,
}

impl XmlEvent {
    /// True for [`XmlEvent::StartElement`].
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, Self::StartElement { .. })
    }

    /// True for [`XmlEvent::EndElement`].
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, Self::EndElement { .. })
    }

    /// True for [`XmlEvent::Text`].
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// True for [`XmlEvent::EndDocument`].
    #[inline]
    pub fn is_end_document(&self) -> bool {
        matches!(self, Self::EndDocument)
    }

    /// The element name, for start and end elements.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::StartElement { name, .. } | Self::EndElement { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The event's position. `EndDocument` is synthetic and has none.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::StartElement { position, .. }
            | Self::EndElement { position, .. }
            | Self::Text { position, .. } => Some(*position),
            Self::EndDocument => None,
        }
    }

    /// The text content, for text events.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Looks up an attribute value by name, for start elements.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartElement { attributes, .. } => attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_start() -> XmlEvent {
        XmlEvent::StartElement {
            name: "item".to_string(),
            attributes: vec![
                Attribute::new("id", "7"),
                Attribute::new("class", "tool"),
            ],
            position: Position::new(2, 5),
        }
    }

    #[test]
    fn test_predicates() {
        assert!(sample_start().is_start_element());
        assert!(XmlEvent::EndDocument.is_end_document());
        assert!(XmlEvent::Text {
            content: "x".to_string(),
            position: Position::start()
        }
        .is_text());
        assert!(!XmlEvent::EndDocument.is_text());
    }

    #[test]
    fn test_name_accessor() {
        assert_eq!(sample_start().name(), Some("item"));
        let end = XmlEvent::EndElement {
            name: "item".to_string(),
            position: Position::start(),
        };
        assert_eq!(end.name(), Some("item"));
        assert_eq!(XmlEvent::EndDocument.name(), None);
    }

    #[test]
    fn test_position_accessor() {
        assert_eq!(sample_start().position(), Some(Position::new(2, 5)));
        assert_eq!(XmlEvent::EndDocument.position(), None);
    }

    #[test]
    fn test_attribute_lookup() {
        let event = sample_start();
        assert_eq!(event.attribute("id"), Some("7"));
        assert_eq!(event.attribute("class"), Some("tool"));
        assert_eq!(event.attribute("missing"), None);
        assert_eq!(XmlEvent::EndDocument.attribute("id"), None);
    }

    #[test]
    fn test_as_text() {
        let text = XmlEvent::Text {
            content: "hello".to_string(),
            position: Position::start(),
        };
        assert_eq!(text.as_text(), Some("hello"));
        assert_eq!(sample_start().as_text(), None);
    }
}
