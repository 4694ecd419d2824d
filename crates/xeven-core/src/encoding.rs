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

//! Character encoding handling.
//!
//! The tokenizer works on raw bytes and decodes them to Rust strings at
//! token boundaries. Three encodings are supported: UTF-8 (the default),
//! US-ASCII, and ISO-8859-1. An encoding is picked once, either by the
//! caller at construction time or by the document's XML declaration; the
//! caller's choice wins when both are present.

/// A supported character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8 (default).
    #[default]
    Utf8,
    /// US-ASCII: any byte with the high bit set is a decode error.
    UsAscii,
    /// ISO-8859-1 (Latin-1): every byte maps directly to the code point of
    /// the same value.
    Latin1,
}

impl Encoding {
    /// Resolves an encoding label, case-insensitively.
    ///
    /// Returns `None` for labels this engine does not support (including
    /// UTF-16, which is recognized but not implemented).
    pub fn resolve(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Some(Self::Latin1),
            _ => None,
        }
    }

    /// Decodes a complete byte run into a string.
    ///
    /// The caller is responsible for not splitting a multi-byte sequence
    /// across calls; [`incomplete_utf8_tail`] exists for exactly that.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| format!("invalid UTF-8 sequence: {e}")),
            Self::UsAscii => {
                if let Some(b) = bytes.iter().find(|b| !b.is_ascii()) {
                    Err(format!("byte 0x{b:02X} is not US-ASCII"))
                } else {
                    // Safe: all bytes verified ASCII above.
                    Ok(std::str::from_utf8(bytes).expect("ASCII is valid UTF-8").to_owned())
                }
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Whether decoded byte counts and character counts can differ.
    #[inline]
    pub(crate) fn is_multibyte(&self) -> bool {
        matches!(self, Self::Utf8)
    }
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`, 0 if the
/// input ends on a character boundary.
///
/// Used to hold back a split multi-byte character when flushing a text run
/// that ends at a chunk boundary.
pub fn incomplete_utf8_tail(bytes: &[u8]) -> usize {
    // A sequence is at most 4 bytes; look at the last 3 possible starts.
    let len = bytes.len();
    for back in 1..=3.min(len) {
        let b = bytes[len - back];
        if b < 0x80 {
            return 0; // ASCII, complete
        }
        if b >= 0xC0 {
            // Start byte found `back` bytes from the end; how long should
            // the sequence be?
            let needed = if b >= 0xF0 {
                4
            } else if b >= 0xE0 {
                3
            } else {
                2
            };
            return if back < needed { back } else { 0 };
        }
        // Continuation byte, keep walking back.
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_labels() {
        assert_eq!(Encoding::resolve("UTF-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::resolve("utf8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::resolve("US-ASCII"), Some(Encoding::UsAscii));
        assert_eq!(Encoding::resolve("ascii"), Some(Encoding::UsAscii));
        assert_eq!(Encoding::resolve("ISO-8859-1"), Some(Encoding::Latin1));
        assert_eq!(Encoding::resolve("Latin1"), Some(Encoding::Latin1));
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(Encoding::resolve("utf-16"), None);
        assert_eq!(Encoding::resolve("shift-jis"), None);
        assert_eq!(Encoding::resolve(""), None);
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(Encoding::Utf8.decode("héllo".as_bytes()).unwrap(), "héllo");
        assert!(Encoding::Utf8.decode(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn test_decode_ascii() {
        assert_eq!(Encoding::UsAscii.decode(b"plain").unwrap(), "plain");
        let err = Encoding::UsAscii.decode(&[b'a', 0xE9]).unwrap_err();
        assert!(err.contains("0xE9"));
    }

    #[test]
    fn test_decode_latin1() {
        // 0xE9 is 'é' in Latin-1.
        assert_eq!(Encoding::Latin1.decode(&[b'c', b'a', b'f', 0xE9]).unwrap(), "café");
    }

    #[test]
    fn test_incomplete_tail_complete_input() {
        assert_eq!(incomplete_utf8_tail(b"ascii"), 0);
        assert_eq!(incomplete_utf8_tail("héllo".as_bytes()), 0);
        assert_eq!(incomplete_utf8_tail(b""), 0);
    }

    #[test]
    fn test_incomplete_tail_split_two_byte() {
        // 'é' is 0xC3 0xA9; cut after the start byte.
        let bytes = "é".as_bytes();
        assert_eq!(incomplete_utf8_tail(&bytes[..1]), 1);
    }

    #[test]
    fn test_incomplete_tail_split_three_byte() {
        // '€' is 0xE2 0x82 0xAC.
        let bytes = "€".as_bytes();
        assert_eq!(incomplete_utf8_tail(&bytes[..1]), 1);
        assert_eq!(incomplete_utf8_tail(&bytes[..2]), 2);
    }

    #[test]
    fn test_incomplete_tail_split_four_byte() {
        // '🎉' is 0xF0 0x9F 0x8E 0x89.
        let bytes = "🎉".as_bytes();
        assert_eq!(incomplete_utf8_tail(&bytes[..3]), 3);
    }
}
