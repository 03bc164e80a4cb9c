/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Reading, rewriting and writing UCF constraint files.

pub mod generate;

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use regex::Regex;

pub use self::generate::{generate, GenerateOptions, PinFilter};

use crate::common::{split_lines, EOL};
#[allow(unused)]
use crate::log::*;
use crate::model::{BoardId, Catalog};

lazy_static! {
    /// `NET <net> LOC = "<pin>" <rest>`: prefix through the opening quote, the
    /// pin, and everything from the closing quote on.
    static ref NET_PATTERN: Regex =
        Regex::new(r#"^(\s*NET\s*\S+\s*LOC\s*=\s*")([^"]+)(".*)$"#).unwrap();
}

/// Pin named by a `NET ... LOC="..."` line, if the line is one.
pub fn loc_pin(line: &str) -> Option<&str> {
    NET_PATTERN.captures(line).and_then(|caps| caps.get(2)).map(|pin| pin.as_str())
}

/// Replaces the LOC pin of a constraint line through `pin_map`. Other lines,
/// and pins the map does not know, come back untouched.
pub fn transform_line<'l>(line: &'l str, pin_map: &HashMap<String, String>) -> Cow<'l, str> {
    let caps = match NET_PATTERN.captures(line) {
        Some(caps) => caps,
        None => return Cow::Borrowed(line),
    };

    let pin = &caps[2];
    match pin_map.get(pin) {
        Some(replacement) => Cow::Owned(format!("{}{}{}", &caps[1], replacement, &caps[3])),
        None => Cow::Borrowed(line),
    }
}

/// Rewrites a whole constraint file. Every line, the last one included, ends
/// with `EOL`.
pub fn transform(text: &str, pin_map: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(text.len());
    for line in split_lines(text) {
        output.push_str(&transform_line(line, pin_map));
        output.push_str(EOL);
    }
    output
}

/// A constraint line locating a net on a pin the board does not have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidPin {
    /// 1-based.
    pub line_number: usize,
    pub pin: String,
    pub line: String,
}

impl std::fmt::Display for InvalidPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid FPGA pin '{}': {}", self.pin, self.line)
    }
}

/// Checks every constraint line of `text` against the physical pins of `board`.
pub fn validate(text: &str, catalog: &Catalog, board: BoardId) -> Vec<InvalidPin> {
    let physical: HashSet<&str> = catalog.pins(board).into_iter()
        .filter_map(|pin| catalog.pin_view(pin).physical_name())
        .collect();

    let mut invalid = Vec::new();
    for (idx, line) in split_lines(text).into_iter().enumerate() {
        if let Some(pin) = loc_pin(line) {
            if !physical.contains(pin) {
                let entry = InvalidPin {
                    line_number: idx + 1,
                    pin: pin.to_string(),
                    line: line.to_string(),
                };
                dbg_log!(DBG_CRITICAL, "{}", entry);
                invalid.push(entry);
            }
        }
    }

    invalid
}
