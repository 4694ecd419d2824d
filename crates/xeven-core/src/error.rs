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

//! Error types for the tokenizer engine.

use crate::position::Position;
use std::fmt;
use thiserror::Error;

/// The kind of failure the tokenizer detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    /// Input ended before a complete root element was parsed: either the
    /// document contained nothing but prolog material, or elements were
    /// still open when the final chunk ran out.
    NoElements,
    /// The final chunk ended in the middle of a markup construct.
    UnclosedToken,
    /// Malformed markup that does not fit a more specific kind.
    Syntax(String),
    /// An end tag does not match the element currently open.
    MismatchedTag { expected: String, found: String },
    /// The same attribute name appeared twice in one tag.
    DuplicateAttribute(String),
    /// Reference to an entity this engine does not define.
    UndefinedEntity(String),
    /// A second root element, or non-whitespace text after the root closed.
    JunkAfterDocument,
    /// Byte sequence invalid for the active encoding.
    Decode(String),
    /// Encoding label this engine does not recognize.
    UnknownEncoding(String),
}

impl fmt::Display for TokenizeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoElements => write!(f, "no element found"),
            Self::UnclosedToken => write!(f, "unclosed token"),
            Self::Syntax(msg) => write!(f, "{msg}"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute(name) => write!(f, "duplicate attribute '{name}'"),
            Self::UndefinedEntity(name) => write!(f, "undefined entity '&{name};'"),
            Self::JunkAfterDocument => write!(f, "junk after document element"),
            Self::Decode(msg) => write!(f, "{msg}"),
            Self::UnknownEncoding(label) => write!(f, "unknown encoding '{label}'"),
        }
    }
}

/// An error raised while tokenizing input.
///
/// Carries the kind of violation together with the position the scan had
/// reached when it was detected. After an error the tokenizer is poisoned:
/// every later feed returns the same error again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at {position}")]
pub struct TokenizeError {
    /// The kind of error.
    pub kind: TokenizeErrorKind,
    /// Where in the document the scan stood when the error was detected.
    pub position: Position,
}

impl TokenizeError {
    /// Creates a new tokenize error.
    #[inline]
    pub fn new(kind: TokenizeErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Creates a syntax error with a free-form message.
    #[inline]
    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::new(TokenizeErrorKind::Syntax(message.into()), position)
    }

    /// True if this is the "no element found" end-of-input failure.
    ///
    /// Consumers treat this kind specially: on a final chunk it is the
    /// signature of a stream that ended before the document did.
    #[inline]
    pub fn is_no_elements(&self) -> bool {
        matches!(self.kind, TokenizeErrorKind::NoElements)
    }
}

/// Result type for tokenizer operations.
pub type TokenizeResult<T> = Result<T, TokenizeError>;
