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

//! Error types for the pull parser.
//!
//! The taxonomy separates failures by what the caller can do about them:
//!
//! - **I/O errors**: the byte source failed; whether a retry helps is the
//!   source's business
//! - **Truncation**: the stream ended before the document did — re-fetch
//!   and parse again from scratch
//! - **Malformed documents**: the bytes themselves are wrong; retrying the
//!   same fetch cannot help
//! - **Usage errors**: the caller pulled from a parser that has nothing
//!   left to give — a programming mistake, not a data problem
//!
//! # Examples
//!
//! ```
//! use xeven_stream::{StreamError, XmlPullParser};
//!
//! let mut parser = XmlPullParser::from_str("<a><b></a>");
//! let err = loop {
//!     match parser.next_event() {
//!         Ok(_) => continue,
//!         Err(e) => break e,
//!     }
//! };
//! assert!(matches!(err, StreamError::Malformed { .. }));
//! assert!(!err.is_retryable());
//! assert_eq!(err.line(), Some(1));
//! ```

use thiserror::Error;

/// Errors raised by [`XmlPullParser`](crate::XmlPullParser).
#[derive(Error, Debug)]
pub enum StreamError {
    /// The byte source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer engine could not be created for the requested
    /// encoding. Raised at construction, never mid-parse.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The stream ended before a complete document was parsed.
    ///
    /// This is the classification for a connection that closed
    /// mid-transfer. The document may well be fine at the origin: the
    /// caller may re-fetch and parse again from scratch. `code` is a
    /// retry-hint in HTTP status terms.
    #[error("transport truncation ({code}): {message}")]
    Truncated { code: u16, message: String },

    /// The document violates XML well-formedness.
    ///
    /// Carries the engine's exact position and message. Not retryable:
    /// the same bytes will fail the same way.
    #[error("XML parse error at {line}:{column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    /// The parser already delivered its terminal event.
    #[error("XML parser is finished")]
    Finished,

    /// The source is exhausted and no event is pending, yet no terminal
    /// event was ever produced. Happens when pulling past a document that
    /// never got to its end — for instance after draining the events that
    /// preceded a parse failure.
    #[error("parsing past end of XML document")]
    PastEnd,
}

impl StreamError {
    /// Retry-hint code carried by [`StreamError::Truncated`]: the
    /// HTTP-408-equivalent "request timed out" signal.
    pub const RETRY_HINT_TIMEOUT: u16 = 408;

    /// Creates a malformed-document error.
    #[inline]
    pub fn malformed(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a truncation error with the standard retry hint.
    #[inline]
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::Truncated {
            code: Self::RETRY_HINT_TIMEOUT,
            message: message.into(),
        }
    }

    /// Whether a fresh fetch and re-parse could plausibly succeed.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// The line number, for errors that carry one.
    #[inline]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The column number, for errors that carry one.
    #[inline]
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Malformed { column, .. } => Some(*column),
            _ => None,
        }
    }
}

/// Result type for pull-parser operations.
pub type StreamResult<T> = Result<T, StreamError>;
