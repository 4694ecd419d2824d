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

//! XML entity decoding.
//!
//! Handles the five predefined entities (`&lt; &gt; &amp; &quot; &apos;`)
//! and decimal/hexadecimal character references (`&#123;` / `&#x7B;`).
//! There is no DTD processing, so any other named entity is undefined.

use memchr::memchr;
use std::borrow::Cow;

/// A failure while decoding entity references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Named entity with no definition.
    Undefined(String),
    /// Reference that is not lexically well formed, or a character
    /// reference naming a code point XML forbids.
    Malformed(String),
}

/// Decodes all entity references in `input`.
///
/// Returns `Cow::Borrowed` when the input contains no `&` at all, which is
/// the common case for markup-free text runs.
pub fn decode(input: &str) -> Result<Cow<'_, str>, EntityError> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(input));
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let semi = memchr(b';', rest.as_bytes())
            .ok_or_else(|| EntityError::Malformed("unterminated entity reference".to_string()))?;
        let name = &rest[1..semi];
        result.push(decode_one(name)?);
        rest = &rest[semi + 1..];
    }
    result.push_str(rest);
    Ok(Cow::Owned(result))
}

/// Decodes a single reference, given the text between `&` and `;`.
fn decode_one(name: &str) -> Result<char, EntityError> {
    match name {
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        _ => {
            if let Some(digits) = name.strip_prefix('#') {
                decode_char_ref(digits)
            } else if !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric()) {
                Err(EntityError::Undefined(name.to_string()))
            } else {
                Err(EntityError::Malformed(format!("malformed entity reference '&{name};'")))
            }
        }
    }
}

/// Decodes a character reference, given the digits after `&#`.
fn decode_char_ref(digits: &str) -> Result<char, EntityError> {
    let value = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16)
    } else {
        digits.parse::<u32>()
    }
    .map_err(|_| EntityError::Malformed(format!("malformed character reference '&#{digits};'")))?;

    match char::from_u32(value) {
        Some(c) if is_valid_xml_char(c) => Ok(c),
        _ => Err(EntityError::Malformed(format!(
            "character reference '&#{digits};' names an invalid XML character"
        ))),
    }
}

/// True for code points the XML 1.0 `Char` production allows.
pub fn is_valid_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
