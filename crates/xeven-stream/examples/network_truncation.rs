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

//! Demonstration of truncation-aware error handling
//!
//! Simulates a network body that dies mid-transfer and shows how the
//! resulting failure differs from a genuinely malformed document.

use std::io::Cursor;
use xeven_stream::{ReadSource, StreamError, XmlPullParser};

fn run(label: &str, bytes: &[u8]) {
    println!("-- {label}");
    let mut source = ReadSource::new(Cursor::new(bytes.to_vec()));
    let mut parser = XmlPullParser::new(&mut source);

    while parser.has_next() {
        match parser.next_event() {
            Ok(event) => println!("   event: {event:?}"),
            Err(StreamError::Truncated { code, .. }) => {
                println!("   truncated (retry hint {code}): re-fetch and parse again");
                break;
            }
            Err(err) => {
                println!("   fatal: {err}");
                break;
            }
        }
    }
    println!();
}

fn main() {
    // A complete document parses to the terminal event.
    run("complete", b"<status><code>ok</code></status>");

    // The same document with the connection cut between elements: the
    // parser reports a retryable truncation, not a parse error.
    run("connection died", b"<status><code>ok</code>");

    // A genuinely malformed document is not retryable.
    run("malformed", b"<status></code></status>");
}
