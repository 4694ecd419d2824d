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

//! Chunk-fed XML tokenizer.
//!
//! The tokenizer is push-based: the caller reads the document in chunks of
//! whatever size its transport produces and hands each chunk to
//! [`Tokenizer::feed`] together with a flag marking the final chunk. Every
//! construct that is complete within the bytes seen so far is reported
//! synchronously through the [`TokenSink`] callbacks; bytes belonging to a
//! construct that is still open (a tag, entity reference, or multi-byte
//! character split across a chunk boundary) are carried over to the next
//! feed.
//!
//! Well-formedness checks cover tag nesting and name matching, the
//! single-root rule, attribute syntax and uniqueness, entity and character
//! references, and placement rules for text, CDATA, and DOCTYPE. There is
//! no DTD processing: a DOCTYPE declaration is skipped, and entities beyond
//! the predefined five are undefined.
//!
//! # Examples
//!
//! ```
//! use xeven_core::{Attribute, Position, TokenSink, Tokenizer};
//!
//! #[derive(Default)]
//! struct Trace(Vec<String>);
//!
//! impl TokenSink for Trace {
//!     fn start_element(&mut self, name: String, _a: Vec<Attribute>, _p: Position) {
//!         self.0.push(format!("+{name}"));
//!     }
//!     fn end_element(&mut self, name: String, _p: Position) {
//!         self.0.push(format!("-{name}"));
//!     }
//!     fn characters(&mut self, text: String, _p: Position) {
//!         self.0.push(text);
//!     }
//! }
//!
//! let mut trace = Trace::default();
//! let mut tokenizer = Tokenizer::new();
//! // The document may be fed in arbitrary pieces.
//! tokenizer.feed(b"<greeting>hel", false, &mut trace).unwrap();
//! tokenizer.feed(b"lo</greeting>", true, &mut trace).unwrap();
//! assert_eq!(trace.0, vec!["+greeting", "hel", "lo", "-greeting"]);
//! ```

use crate::encoding::{incomplete_utf8_tail, Encoding};
use crate::entities::{self, EntityError};
use crate::error::{TokenizeError, TokenizeErrorKind, TokenizeResult};
use crate::position::Position;
use crate::sink::{Attribute, TokenSink};
use memchr::{memchr, memmem, memrchr};
use std::borrow::Cow;

const COMMENT_OPEN: &[u8] = b"<!--";
const CDATA_OPEN: &[u8] = b"<![CDATA[";
const DOCTYPE_OPEN: &[u8] = b"<!DOCTYPE";

/// Where in the document the scan currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Before the root element: declaration, DOCTYPE, PIs, comments,
    /// whitespace.
    Prolog,
    /// Inside the root element.
    Content,
    /// After the root element closed: PIs, comments, whitespace.
    Epilog,
}

/// Streaming XML tokenizer.
///
/// Created once per document; see the [module docs](self) for the feeding
/// contract. After any feed returns an error the tokenizer is poisoned and
/// every later feed returns that same error.
#[derive(Debug)]
pub struct Tokenizer {
    encoding: Encoding,
    /// True when the encoding came from the constructor; the document's own
    /// declaration cannot override it then.
    encoding_fixed: bool,
    /// Unconsumed bytes carried between feeds.
    buf: Vec<u8>,
    /// Position of the first unconsumed byte.
    pos: Position,
    stage: Stage,
    /// Names of the currently open elements.
    stack: Vec<String>,
    /// True until the first construct or text has been consumed; the XML
    /// declaration is only legal while this holds.
    at_document_start: bool,
    error: Option<TokenizeError>,
}

impl Tokenizer {
    /// Creates a tokenizer with the default encoding (UTF-8, unless the
    /// document declares another supported one).
    pub fn new() -> Self {
        Self::with(Encoding::Utf8, false)
    }

    /// Creates a tokenizer with a caller-chosen encoding.
    ///
    /// The label wins over whatever the document's XML declaration says.
    /// Fails with [`TokenizeErrorKind::UnknownEncoding`] for labels this
    /// engine does not support.
    pub fn with_encoding(label: &str) -> TokenizeResult<Self> {
        let encoding = Encoding::resolve(label).ok_or_else(|| {
            TokenizeError::new(
                TokenizeErrorKind::UnknownEncoding(label.to_string()),
                Position::start(),
            )
        })?;
        Ok(Self::with(encoding, true))
    }

    fn with(encoding: Encoding, encoding_fixed: bool) -> Self {
        Self {
            encoding,
            encoding_fixed,
            buf: Vec::new(),
            pos: Position::start(),
            stage: Stage::Prolog,
            stack: Vec::new(),
            at_document_start: true,
            error: None,
        }
    }

    /// The position of the next byte the scan will look at.
    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Feeds one chunk of input, reporting complete constructs to `sink`.
    ///
    /// `is_last` marks the final chunk; an empty final chunk is legal and
    /// runs only the end-of-document checks. Callbacks fire synchronously,
    /// in document order, before this call returns.
    pub fn feed<S: TokenSink + ?Sized>(
        &mut self,
        chunk: &[u8],
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.buf.extend_from_slice(chunk);
        let outcome = self
            .scan(is_last, sink)
            .and_then(|_| if is_last { self.check_end() } else { Ok(()) });
        if let Err(err) = &outcome {
            self.error = Some(err.clone());
        }
        outcome
    }

    fn scan<S: TokenSink + ?Sized>(&mut self, is_last: bool, sink: &mut S) -> TokenizeResult<()> {
        if self.at_document_start {
            if self.buf.starts_with(&[0xEF, 0xBB, 0xBF]) {
                // UTF-8 byte order mark; not part of the document.
                self.buf.drain(..3);
            } else if !is_last
                && !self.buf.is_empty()
                && self.buf.len() < 3
                && [0xEF, 0xBB, 0xBF].starts_with(&self.buf)
            {
                // Might be a byte order mark split across chunks.
                return Ok(());
            }
        }
        loop {
            if self.buf.is_empty() {
                return Ok(());
            }
            let progressed = if self.buf[0] == b'<' {
                self.scan_markup(is_last, sink)?
            } else {
                self.scan_text(is_last, sink)?
            };
            if !progressed {
                return Ok(());
            }
        }
    }

    /// End-of-document checks, run once the final chunk has been scanned.
    fn check_end(&mut self) -> TokenizeResult<()> {
        match self.stage {
            Stage::Epilog => Ok(()),
            // Nothing but prolog material, or elements still open. This is
            // the error a truncated stream produces.
            _ => Err(TokenizeError::new(TokenizeErrorKind::NoElements, self.pos)),
        }
    }

    /// Consumes `n` bytes from the front of the carry buffer, advancing the
    /// position over them.
    fn consume(&mut self, n: usize) {
        self.pos
            .advance_bytes(&self.buf[..n], self.encoding.is_multibyte());
        self.buf.drain(..n);
        self.at_document_start = false;
    }

    /// The construct at the front of the buffer is not complete yet: wait
    /// for more input, unless this was the final chunk.
    fn incomplete(&self, is_last: bool) -> TokenizeResult<bool> {
        if is_last {
            Err(TokenizeError::new(TokenizeErrorKind::UnclosedToken, self.pos))
        } else {
            Ok(false)
        }
    }

    fn decode_at(&self, bytes: &[u8], pos: Position) -> TokenizeResult<String> {
        self.encoding
            .decode(bytes)
            .map_err(|msg| TokenizeError::new(TokenizeErrorKind::Decode(msg), pos))
    }

    fn scan_markup<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        match self.buf.get(1).copied() {
            None => self.incomplete(is_last),
            Some(b'/') => self.scan_end_tag(is_last, sink),
            Some(b'!') => self.scan_bang(is_last, sink),
            Some(b'?') => self.scan_pi(is_last, sink),
            Some(_) => self.scan_start_tag(is_last, sink),
        }
    }

    fn scan_start_tag<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        let Some(gt) = find_tag_end(&self.buf) else {
            return self.incomplete(is_last);
        };
        let raw = self.buf[1..gt].to_vec();
        let interior = self.decode_at(&raw, pos)?;
        let (interior, empty) = match interior.strip_suffix('/') {
            Some(rest) => (rest, true),
            None => (interior.as_str(), false),
        };
        let (name, attributes) = parse_tag_interior(interior, pos)?;

        match self.stage {
            Stage::Epilog => {
                return Err(TokenizeError::new(TokenizeErrorKind::JunkAfterDocument, pos));
            }
            Stage::Prolog => self.stage = Stage::Content,
            Stage::Content => {}
        }
        self.consume(gt + 1);
        sink.start_element(name.clone(), attributes, pos);
        if empty {
            if self.stack.is_empty() {
                self.stage = Stage::Epilog;
            }
            sink.end_element(name, pos);
        } else {
            self.stack.push(name);
        }
        Ok(true)
    }

    fn scan_end_tag<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        let Some(gt) = memchr(b'>', &self.buf) else {
            return self.incomplete(is_last);
        };
        let raw = self.buf[2..gt].to_vec();
        let text = self.decode_at(&raw, pos)?;
        // Whitespace is allowed before '>' but not after '</'.
        let name = text.trim_end();
        if name.is_empty() || text.starts_with(char::is_whitespace) || !is_valid_name(name) {
            return Err(TokenizeError::syntax(
                format!("invalid end tag '</{}>'", text.trim()),
                pos,
            ));
        }
        match self.stack.last() {
            Some(open) if open == name => {
                self.stack.pop();
            }
            Some(open) => {
                return Err(TokenizeError::new(
                    TokenizeErrorKind::MismatchedTag {
                        expected: open.clone(),
                        found: name.to_string(),
                    },
                    pos,
                ));
            }
            None => {
                return Err(TokenizeError::syntax(
                    format!("end tag '</{name}>' with no open element"),
                    pos,
                ));
            }
        }
        if self.stack.is_empty() {
            self.stage = Stage::Epilog;
        }
        self.consume(gt + 1);
        sink.end_element(name.to_string(), pos);
        Ok(true)
    }

    fn scan_bang<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        if self.buf.len() >= COMMENT_OPEN.len() && self.buf.starts_with(COMMENT_OPEN) {
            return self.scan_comment(is_last, sink);
        }
        if self.buf.len() >= CDATA_OPEN.len() && self.buf.starts_with(CDATA_OPEN) {
            return self.scan_cdata(is_last, sink);
        }
        if self.buf.len() >= DOCTYPE_OPEN.len()
            && self.buf[..DOCTYPE_OPEN.len()].eq_ignore_ascii_case(DOCTYPE_OPEN)
        {
            return self.scan_doctype(is_last);
        }
        if self.buf.len() < CDATA_OPEN.len() {
            // Not enough bytes to tell the three apart yet.
            let is_prefix = |full: &[u8]| {
                full.len() >= self.buf.len() && full[..self.buf.len()].eq_ignore_ascii_case(&self.buf)
            };
            if is_prefix(COMMENT_OPEN) || is_prefix(CDATA_OPEN) || is_prefix(DOCTYPE_OPEN) {
                return self.incomplete(is_last);
            }
        }
        Err(TokenizeError::syntax("invalid markup declaration", self.pos))
    }

    fn scan_comment<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        let body = &self.buf[COMMENT_OPEN.len()..];
        let Some(end) = memmem::find(body, b"-->") else {
            return self.incomplete(is_last);
        };
        let content = &body[..end];
        if memmem::find(content, b"--").is_some() || content.last() == Some(&b'-') {
            return Err(TokenizeError::syntax("'--' is not allowed inside a comment", pos));
        }
        let text = self.decode_at(&content.to_vec(), pos)?;
        self.consume(COMMENT_OPEN.len() + end + 3);
        sink.comment(text, pos);
        Ok(true)
    }

    fn scan_cdata<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        if self.stage != Stage::Content {
            return Err(TokenizeError::syntax(
                "CDATA section outside of the root element",
                pos,
            ));
        }
        let body = &self.buf[CDATA_OPEN.len()..];
        let Some(end) = memmem::find(body, b"]]>") else {
            return self.incomplete(is_last);
        };
        let raw = body[..end].to_vec();
        let text = self.decode_at(&raw, pos)?;
        let text = normalize_newlines(&text).into_owned();
        self.consume(CDATA_OPEN.len() + end + 3);
        // CDATA content is character data; entities inside it stay literal.
        sink.characters(text, pos);
        Ok(true)
    }

    fn scan_doctype(&mut self, is_last: bool) -> TokenizeResult<bool> {
        let pos = self.pos;
        if self.stage != Stage::Prolog {
            return Err(TokenizeError::syntax(
                "DOCTYPE is only allowed before the root element",
                pos,
            ));
        }
        // Find the closing '>' outside the optional [...] internal subset.
        // The subset itself is skipped, never processed.
        let mut depth = 0usize;
        for (i, &b) in self.buf.iter().enumerate().skip(DOCTYPE_OPEN.len()) {
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.consume(i + 1);
                    return Ok(true);
                }
                _ => {}
            }
        }
        self.incomplete(is_last)
    }

    fn scan_pi<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        let body = &self.buf[2..];
        let Some(end) = memmem::find(body, b"?>") else {
            return self.incomplete(is_last);
        };
        let raw = body[..end].to_vec();
        let text = self.decode_at(&raw, pos)?;
        let (target, data) = match text.find(char::is_whitespace) {
            Some(ws) => {
                let data = text[ws..].trim_start().to_string();
                (
                    text[..ws].to_string(),
                    if data.is_empty() { None } else { Some(data) },
                )
            }
            None => (text.clone(), None),
        };
        if !is_valid_name(&target) {
            return Err(TokenizeError::syntax(
                format!("invalid processing instruction target '{target}'"),
                pos,
            ));
        }
        if target.eq_ignore_ascii_case("xml") {
            if !self.at_document_start {
                return Err(TokenizeError::syntax(
                    "XML declaration is only allowed at the start of the document",
                    pos,
                ));
            }
            self.apply_declaration(data.as_deref().unwrap_or(""), pos)?;
            self.consume(2 + end + 2);
            return Ok(true);
        }
        self.consume(2 + end + 2);
        sink.processing_instruction(target, data, pos);
        Ok(true)
    }

    /// Applies the `encoding` pseudo-attribute of the XML declaration,
    /// unless the caller fixed the encoding at construction time.
    fn apply_declaration(&mut self, data: &str, pos: Position) -> TokenizeResult<()> {
        if self.encoding_fixed {
            return Ok(());
        }
        if let Some(label) = pseudo_attribute(data, "encoding") {
            self.encoding = Encoding::resolve(&label).ok_or_else(|| {
                TokenizeError::new(TokenizeErrorKind::UnknownEncoding(label), pos)
            })?;
        }
        Ok(())
    }

    fn scan_text<S: TokenSink + ?Sized>(
        &mut self,
        is_last: bool,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let pos = self.pos;
        let (run_end, complete) = match memchr(b'<', &self.buf) {
            Some(lt) => (lt, true),
            None => (self.buf.len(), false),
        };
        if self.stage != Stage::Content {
            // Outside the root element only whitespace is allowed, and it
            // produces no callback.
            let run = &self.buf[..run_end];
            if let Some(off) = run
                .iter()
                .position(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            {
                let mut err_pos = pos;
                err_pos.advance_bytes(&run[..off], self.encoding.is_multibyte());
                return Err(match self.stage {
                    Stage::Epilog => {
                        TokenizeError::new(TokenizeErrorKind::JunkAfterDocument, err_pos)
                    }
                    _ => TokenizeError::syntax("text outside of the root element", err_pos),
                });
            }
            self.consume(run_end);
            return Ok(true);
        }
        self.emit_text(run_end, complete, is_last, pos, sink)
    }

    fn emit_text<S: TokenSink + ?Sized>(
        &mut self,
        run_end: usize,
        complete: bool,
        is_last: bool,
        pos: Position,
        sink: &mut S,
    ) -> TokenizeResult<bool> {
        let mut end = run_end;
        if !complete && !is_last {
            // The run stops at the end of the buffered bytes; hold back any
            // piece that may continue in the next chunk.
            if let Some(amp) = memrchr(b'&', &self.buf[..end]) {
                if memchr(b';', &self.buf[amp..end]).is_none() {
                    end = amp;
                }
            }
            if self.encoding.is_multibyte() {
                end -= incomplete_utf8_tail(&self.buf[..end]);
            }
        }
        if end == 0 {
            return Ok(false);
        }
        let raw = self.buf[..end].to_vec();
        let decoded = self.decode_at(&raw, pos)?;
        let normalized = normalize_newlines(&decoded);
        let text = entities::decode(&normalized)
            .map_err(|e| map_entity_err(e, pos))?
            .into_owned();
        self.consume(end);
        sink.characters(text, pos);
        Ok(true)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the index of the '>' closing the tag that starts at `buf[0]`,
/// ignoring '>' inside quoted attribute values.
fn find_tag_end(buf: &[u8]) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in buf.iter().enumerate().skip(1) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Parses the text between '<' and '>' (with a trailing '/' already
/// stripped) into a name and its attributes.
fn parse_tag_interior(interior: &str, pos: Position) -> TokenizeResult<(String, Vec<Attribute>)> {
    let interior = interior.trim_end();
    let name_end = interior
        .find(|c: char| c.is_whitespace())
        .unwrap_or(interior.len());
    let name = &interior[..name_end];
    if !is_valid_name(name) {
        return Err(TokenizeError::syntax(
            format!("invalid element name '{name}'"),
            pos,
        ));
    }

    let mut attributes: Vec<Attribute> = Vec::new();
    let mut rest = interior[name_end..].trim_start();
    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            TokenizeError::syntax(format!("attribute without value in <{name}>"), pos)
        })?;
        let attr_name = rest[..eq].trim_end();
        if !is_valid_name(attr_name) {
            return Err(TokenizeError::syntax(
                format!("invalid attribute name '{attr_name}'"),
                pos,
            ));
        }
        if attributes.iter().any(|a| a.name == attr_name) {
            return Err(TokenizeError::new(
                TokenizeErrorKind::DuplicateAttribute(attr_name.to_string()),
                pos,
            ));
        }
        rest = rest[eq + 1..].trim_start();
        let quote = rest
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| {
                TokenizeError::syntax(format!("unquoted value for attribute '{attr_name}'"), pos)
            })?;
        let value_rest = &rest[1..];
        let end = value_rest.find(quote).ok_or_else(|| {
            TokenizeError::syntax(format!("unterminated value for attribute '{attr_name}'"), pos)
        })?;
        let raw_value = &value_rest[..end];
        if raw_value.contains('<') {
            return Err(TokenizeError::syntax(
                format!("'<' in value of attribute '{attr_name}'"),
                pos,
            ));
        }
        let normalized = normalize_attr_ws(raw_value);
        let value = entities::decode(&normalized)
            .map_err(|e| map_entity_err(e, pos))?
            .into_owned();
        attributes.push(Attribute::new(attr_name, value));
        rest = value_rest[end + 1..].trim_start();
    }
    Ok((name.to_string(), attributes))
}

fn map_entity_err(err: EntityError, pos: Position) -> TokenizeError {
    match err {
        EntityError::Undefined(name) => {
            TokenizeError::new(TokenizeErrorKind::UndefinedEntity(name), pos)
        }
        EntityError::Malformed(msg) => TokenizeError::syntax(msg, pos),
    }
}

/// Attribute-value normalization: literal whitespace becomes a space.
/// Character references to whitespace survive because entity decoding runs
/// afterwards.
fn normalize_attr_ws(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
        .collect()
}

/// Line-ending normalization for character data: `\r\n` and lone `\r`
/// become `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => {}
        _ => return false,
    }
    chars.all(is_name_char)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':') || !c.is_ascii()
}

/// Extracts a quoted pseudo-attribute (`name="value"`) from the data of an
/// XML declaration.
fn pseudo_attribute(data: &str, name: &str) -> Option<String> {
    let idx = data.find(name)?;
    let rest = data[idx + name.len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Ev {
        Start(String, Vec<(String, String)>),
        End(String),
        Text(String),
        Comment(String),
        Pi(String, Option<String>),
    }

    #[derive(Default)]
    struct Collector {
        events: Vec<Ev>,
        positions: Vec<Position>,
    }

    impl TokenSink for Collector {
        fn start_element(&mut self, name: String, attributes: Vec<Attribute>, pos: Position) {
            self.positions.push(pos);
            self.events.push(Ev::Start(
                name,
                attributes.into_iter().map(|a| (a.name, a.value)).collect(),
            ));
        }
        fn end_element(&mut self, name: String, pos: Position) {
            self.positions.push(pos);
            self.events.push(Ev::End(name));
        }
        fn characters(&mut self, text: String, pos: Position) {
            self.positions.push(pos);
            self.events.push(Ev::Text(text));
        }
        fn comment(&mut self, text: String, pos: Position) {
            self.positions.push(pos);
            self.events.push(Ev::Comment(text));
        }
        fn processing_instruction(&mut self, target: String, data: Option<String>, pos: Position) {
            self.positions.push(pos);
            self.events.push(Ev::Pi(target, data));
        }
    }

    fn tokenize(input: &[u8]) -> Result<Vec<Ev>, TokenizeError> {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(input, true, &mut collector)?;
        Ok(collector.events)
    }

    fn tokenize_chunked(input: &[u8], chunk: usize) -> Result<Vec<Ev>, TokenizeError> {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        let mut pieces = input.chunks(chunk).peekable();
        while let Some(piece) = pieces.next() {
            tokenizer.feed(piece, pieces.peek().is_none(), &mut collector)?;
        }
        Ok(collector.events)
    }

    fn start(name: &str) -> Ev {
        Ev::Start(name.to_string(), vec![])
    }

    fn end(name: &str) -> Ev {
        Ev::End(name.to_string())
    }

    fn text(content: &str) -> Ev {
        Ev::Text(content.to_string())
    }

    // ==================== Basic documents ====================

    #[test]
    fn test_simple_document() {
        let events = tokenize(b"<a><b>x</b></a>").unwrap();
        assert_eq!(
            events,
            vec![start("a"), start("b"), text("x"), end("b"), end("a")]
        );
    }

    #[test]
    fn test_attributes_in_order() {
        let events = tokenize(br#"<item id="1" name="wrench" price='9'/>"#).unwrap();
        assert_eq!(
            events,
            vec![
                Ev::Start(
                    "item".to_string(),
                    vec![
                        ("id".to_string(), "1".to_string()),
                        ("name".to_string(), "wrench".to_string()),
                        ("price".to_string(), "9".to_string()),
                    ]
                ),
                end("item"),
            ]
        );
    }

    #[test]
    fn test_empty_element_fires_both_callbacks() {
        let events = tokenize(b"<a><b/></a>").unwrap();
        assert_eq!(events, vec![start("a"), start("b"), end("b"), end("a")]);
    }

    #[test]
    fn test_whitespace_around_root_is_suppressed() {
        let events = tokenize(b"  \n <a>x</a> \n ").unwrap();
        assert_eq!(events, vec![start("a"), text("x"), end("a")]);
    }

    #[test]
    fn test_end_tag_with_trailing_whitespace() {
        let events = tokenize(b"<a>x</a >").unwrap();
        assert_eq!(events, vec![start("a"), text("x"), end("a")]);
    }

    #[test]
    fn test_entities_in_text_and_attributes() {
        let events = tokenize(br#"<a t="1 &lt; 2">&amp;&#65;</a>"#).unwrap();
        assert_eq!(
            events,
            vec![
                Ev::Start(
                    "a".to_string(),
                    vec![("t".to_string(), "1 < 2".to_string())]
                ),
                text("&A"),
                end("a"),
            ]
        );
    }

    #[test]
    fn test_cdata_reported_as_characters() {
        let events = tokenize(b"<a><![CDATA[<not> &markup;]]></a>").unwrap();
        assert_eq!(events, vec![start("a"), text("<not> &markup;"), end("a")]);
    }

    #[test]
    fn test_comment_and_pi_callbacks() {
        let events = tokenize(b"<?style sheet?><a><!-- note --></a>").unwrap();
        assert_eq!(
            events,
            vec![
                Ev::Pi("style".to_string(), Some("sheet".to_string())),
                start("a"),
                Ev::Comment(" note ".to_string()),
                end("a"),
            ]
        );
    }

    #[test]
    fn test_doctype_is_skipped() {
        let events = tokenize(b"<!DOCTYPE greeting [<!ELEMENT greeting (#PCDATA)>]><greeting>hi</greeting>").unwrap();
        assert_eq!(events, vec![start("greeting"), text("hi"), end("greeting")]);
    }

    #[test]
    fn test_newline_normalization() {
        let events = tokenize(b"<a>x\r\ny\rz</a>").unwrap();
        assert_eq!(events, vec![start("a"), text("x\ny\nz"), end("a")]);
    }

    #[test]
    fn test_attribute_value_normalization() {
        let events = tokenize(b"<a t=\"x\ny\"/>").unwrap();
        assert_eq!(
            events,
            vec![
                Ev::Start("a".to_string(), vec![("t".to_string(), "x y".to_string())]),
                end("a"),
            ]
        );
    }

    #[test]
    fn test_gt_inside_attribute_value() {
        let events = tokenize(br#"<a expr="1 > 0">x</a>"#).unwrap();
        assert_eq!(
            events,
            vec![
                Ev::Start(
                    "a".to_string(),
                    vec![("expr".to_string(), "1 > 0".to_string())]
                ),
                text("x"),
                end("a"),
            ]
        );
    }

    // ==================== Chunked feeding ====================

    /// Merges adjacent text events, erasing chunk-dependent fragmentation.
    fn merge_text(events: Vec<Ev>) -> Vec<Ev> {
        let mut out: Vec<Ev> = Vec::new();
        for event in events {
            match (&event, out.last_mut()) {
                (Ev::Text(next), Some(Ev::Text(acc))) => acc.push_str(next),
                _ => out.push(event),
            }
        }
        out
    }

    #[test]
    fn test_every_chunk_size_yields_identical_events() {
        let input: &[u8] =
            br#"<?xml version="1.0"?><doc a="v"><item>alpha</item><!--c--><item>beta&amp;</item></doc>"#;
        let whole = merge_text(tokenize(input).unwrap());
        for chunk in 1..input.len() {
            let split = merge_text(tokenize_chunked(input, chunk).unwrap());
            assert_eq!(split, whole, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_text_split_across_chunks_is_fragmented() {
        // Fragmentation is the documented contract; coalescing is the
        // consumer's business.
        let events = tokenize_chunked(b"<a>AB</a>", 4).unwrap();
        assert_eq!(
            events,
            vec![start("a"), text("A"), text("B"), end("a")]
        );
    }

    #[test]
    fn test_tag_split_across_chunks() {
        let events = tokenize_chunked(b"<a><b>x</b>y</a>", 8).unwrap();
        assert_eq!(
            events,
            vec![
                start("a"),
                start("b"),
                text("x"),
                end("b"),
                text("y"),
                end("a")
            ]
        );
    }

    #[test]
    fn test_entity_split_across_chunks() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(b"<a>x&am", false, &mut collector).unwrap();
        tokenizer.feed(b"p;y</a>", true, &mut collector).unwrap();
        assert_eq!(
            collector.events,
            vec![start("a"), text("x"), text("&y"), end("a")]
        );
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let input = "<a>café</a>".as_bytes();
        for chunk in 1..input.len() {
            let events = tokenize_chunked(input, chunk).unwrap();
            let merged: String = events
                .iter()
                .filter_map(|e| match e {
                    Ev::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(merged, "café", "chunk size {chunk}");
        }
    }

    #[test]
    fn test_empty_final_feed() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(b"<a>x</a>", false, &mut collector).unwrap();
        tokenizer.feed(b"", true, &mut collector).unwrap();
        assert_eq!(collector.events, vec![start("a"), text("x"), end("a")]);
    }

    // ==================== Encodings ====================

    #[test]
    fn test_declared_latin1_encoding() {
        let mut input = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf".to_vec();
        input.push(0xE9);
        input.extend_from_slice(b"</a>");
        let events = tokenize(&input).unwrap();
        assert_eq!(events, vec![start("a"), text("café"), end("a")]);
    }

    #[test]
    fn test_constructor_encoding_wins_over_declaration() {
        // Declared UTF-8, constructed Latin-1: the constructor wins, so the
        // 0xE9 byte decodes as 'é' instead of failing UTF-8 validation.
        let mut input = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><a>".to_vec();
        input.push(0xE9);
        input.extend_from_slice(b"</a>");

        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::with_encoding("latin1").unwrap();
        tokenizer.feed(&input, true, &mut collector).unwrap();
        assert_eq!(collector.events, vec![start("a"), text("é"), end("a")]);
    }

    #[test]
    fn test_unknown_constructor_encoding() {
        let err = Tokenizer::with_encoding("utf-16").unwrap_err();
        assert_eq!(
            err.kind,
            TokenizeErrorKind::UnknownEncoding("utf-16".to_string())
        );
    }

    #[test]
    fn test_unknown_declared_encoding() {
        let err = tokenize(b"<?xml version=\"1.0\" encoding=\"EBCDIC\"?><a/>").unwrap_err();
        assert_eq!(
            err.kind,
            TokenizeErrorKind::UnknownEncoding("EBCDIC".to_string())
        );
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::with_encoding("us-ascii").unwrap();
        let err = tokenizer
            .feed(&[b'<', b'a', b'>', 0xC3, 0xA9, b'<', b'/', b'a', b'>'], true, &mut collector)
            .unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Decode(_)));
    }

    #[test]
    fn test_utf8_byte_order_mark_is_stripped() {
        let mut input = vec![0xEF, 0xBB, 0xBF];
        input.extend_from_slice(b"<a/>");
        let events = tokenize(&input).unwrap();
        assert_eq!(events, vec![start("a"), end("a")]);
    }

    // ==================== Malformed documents ====================

    #[test]
    fn test_mismatched_tag_position() {
        let err = tokenize(b"<a><b></c></b></a>").unwrap_err();
        assert_eq!(
            err.kind,
            TokenizeErrorKind::MismatchedTag {
                expected: "b".to_string(),
                found: "c".to_string(),
            }
        );
        assert_eq!(err.position, Position::new(1, 7));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = tokenize(br#"<a x="1" x="2"/>"#).unwrap_err();
        assert_eq!(
            err.kind,
            TokenizeErrorKind::DuplicateAttribute("x".to_string())
        );
    }

    #[test]
    fn test_undefined_entity() {
        let err = tokenize(b"<a>&nbsp;</a>").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UndefinedEntity("nbsp".to_string()));
    }

    #[test]
    fn test_junk_after_document() {
        let err = tokenize(b"<a/>trailing").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::JunkAfterDocument);

        let err = tokenize(b"<a/><b/>").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::JunkAfterDocument);
    }

    #[test]
    fn test_text_before_root() {
        let err = tokenize(b"junk<a/>").unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Syntax(_)));
    }

    #[test]
    fn test_invalid_names() {
        assert!(tokenize(b"<1a/>").is_err());
        assert!(tokenize(b"< a/>").is_err());
        assert!(tokenize(b"<a><-b/></a>").is_err());
    }

    #[test]
    fn test_double_hyphen_in_comment() {
        let err = tokenize(b"<a><!-- x -- y --></a>").unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Syntax(_)));
    }

    #[test]
    fn test_unquoted_attribute_value() {
        let err = tokenize(b"<a x=1/>").unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Syntax(_)));
    }

    #[test]
    fn test_cdata_outside_root() {
        let err = tokenize(b"<![CDATA[x]]><a/>").unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Syntax(_)));
    }

    #[test]
    fn test_misplaced_xml_declaration() {
        let err = tokenize(b"<a><?xml version=\"1.0\"?></a>").unwrap_err();
        assert!(matches!(err.kind, TokenizeErrorKind::Syntax(_)));
    }

    // ==================== End-of-input failures ====================

    #[test]
    fn test_empty_document_is_no_elements() {
        let err = tokenize(b"").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::NoElements);
    }

    #[test]
    fn test_whitespace_only_document_is_no_elements() {
        let err = tokenize(b"  \n\t ").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::NoElements);
    }

    #[test]
    fn test_prolog_only_document_is_no_elements() {
        let err = tokenize(b"<?xml version=\"1.0\"?><!-- only a comment -->").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::NoElements);
    }

    #[test]
    fn test_truncated_content_is_no_elements() {
        // Elements still open when the final chunk runs out: the signature
        // of a stream that died mid-transfer.
        let err = tokenize(b"<a><b>partial").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::NoElements);
    }

    #[test]
    fn test_truncated_inside_tag_is_unclosed_token() {
        let err = tokenize(b"<a><b attr=\"v").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnclosedToken);
    }

    #[test]
    fn test_truncated_inside_comment_is_unclosed_token() {
        let err = tokenize(b"<a><!-- never closed").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnclosedToken);
    }

    // ==================== Poisoning ====================

    #[test]
    fn test_feed_after_error_repeats_the_error() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        let first = tokenizer
            .feed(b"<a></b>", false, &mut collector)
            .unwrap_err();
        let second = tokenizer.feed(b"<more/>", true, &mut collector).unwrap_err();
        assert_eq!(first, second);
    }

    // ==================== Positions ====================

    #[test]
    fn test_positions_across_lines() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer
            .feed(b"<a>\n  <b/>\n</a>", true, &mut collector)
            .unwrap();
        // start a, text, start b, end b, text, end a
        assert_eq!(collector.positions[0], Position::new(1, 1));
        assert_eq!(collector.positions[2], Position::new(2, 3));
        assert_eq!(collector.positions[3], Position::new(2, 3));
        assert_eq!(collector.positions[5], Position::new(3, 1));
    }

    #[test]
    fn test_text_fragment_position_is_first_character() {
        let mut collector = Collector::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(b"<a>hel", false, &mut collector).unwrap();
        tokenizer.feed(b"lo</a>", true, &mut collector).unwrap();
        assert_eq!(collector.events[1], text("hel"));
        assert_eq!(collector.positions[1], Position::new(1, 4));
        assert_eq!(collector.events[2], text("lo"));
        assert_eq!(collector.positions[2], Position::new(1, 7));
    }
}
