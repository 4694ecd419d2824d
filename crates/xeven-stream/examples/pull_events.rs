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

//! Demonstration of pulling events one at a time

use xeven_stream::{XmlEvent, XmlPullParser};

fn main() {
    let document = r#"<?xml version="1.0"?>
<library>
  <book isbn="978-0" year="1979">
    <title>Structured Documents &amp; You</title>
  </book>
  <book isbn="978-1" year="1984">
    <title>Streams at Scale</title>
  </book>
</library>"#;

    let mut parser = XmlPullParser::from_str(document);
    let mut depth = 0usize;

    while parser.has_next() {
        match parser.next_event().unwrap() {
            XmlEvent::StartElement {
                name,
                attributes,
                position,
            } => {
                let attrs: Vec<String> = attributes
                    .iter()
                    .map(|a| format!("{}={}", a.name, a.value))
                    .collect();
                println!(
                    "{}<{name}> [{}] at {position}",
                    "  ".repeat(depth),
                    attrs.join(", ")
                );
                depth += 1;
            }
            XmlEvent::EndElement { name, .. } => {
                depth -= 1;
                println!("{}</{name}>", "  ".repeat(depth));
            }
            XmlEvent::Text { content, .. } => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    println!("{}\"{trimmed}\"", "  ".repeat(depth));
                }
            }
            XmlEvent::EndDocument => println!("(end of document)"),
        }
    }
}
