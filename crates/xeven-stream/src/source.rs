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

//! Byte-source capability for the pull parser.
//!
//! The parser does not care what kind of thing it is reading from; it cares
//! about exactly two capabilities: give me bytes, and tell me whether you
//! are out of them. [`ByteSource`] captures both, with one deliberate
//! wrinkle: some sources (an in-memory buffer) can answer the exhaustion
//! question exactly at any time, while others (a live network fetch) only
//! learn the answer by attempting a read and coming up empty. The parser's
//! feed loop queries the flag before and after each read and tolerates a
//! flag that only becomes accurate post-read, so every implementation gets
//! uniform treatment — there is no type inspection anywhere.
//!
//! # Examples
//!
//! ```
//! use xeven_stream::{ByteSource, MemorySource};
//!
//! let mut source = MemorySource::from("<a/>");
//! let mut buf = [0u8; 2];
//! assert!(!source.is_exhausted());
//! assert_eq!(source.read(&mut buf).unwrap(), 2);
//! assert_eq!(source.read(&mut buf).unwrap(), 2);
//! assert!(source.is_exhausted());
//! ```

use std::io::{self, Read};

/// A stream of document bytes with an exhaustion query.
///
/// `read` may return fewer bytes than the buffer holds; a short read does
/// not imply exhaustion. `is_exhausted` may report `false` right up until a
/// read returns zero bytes — that is the contract for sources that cannot
/// see their own end, and callers must re-query after reading.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes into `buf`, returning how many were
    /// read. Zero means the stream is done.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Whether the stream has no more bytes to give. May only become
    /// accurate after a read has returned zero or reached the end.
    fn is_exhausted(&self) -> bool;
}

/// A parser borrows its source; forwarding through `&mut` is what makes
/// that borrow usable with a generic parser type.
impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// An in-memory byte source.
///
/// Knows its own length, so `is_exhausted` is exact at every moment.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
}

impl MemorySource {
    /// Creates a source over the given bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Number of bytes not yet read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl From<&str> for MemorySource {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

impl From<String> for MemorySource {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// A byte source over any [`io::Read`] — a file, a socket, a response body.
///
/// This is the source shape a live fetch has: it cannot see its own end, so
/// `is_exhausted` stays `false` until a read returns zero bytes. The parser
/// accepts exactly that behavior and will issue one extra (empty) read to
/// discover the end.
#[derive(Debug)]
pub struct ReadSource<R: Read> {
    reader: R,
    eof: bool,
}

impl<R: Read> ReadSource<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self { reader, eof: false }
    }

    /// Consumes the source, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }
        let n = self.reader.read(buf)?;
        if n == 0 {
            self.eof = true;
        }
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.eof
    }
}
