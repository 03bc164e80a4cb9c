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

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusRangeError {
    #[error("Missing ']' in bus range `{0}`")]
    UnclosedBracket(String),
    #[error("Missing ':' in bus range `{0}`")]
    MissingColon(String),
    #[error("Invalid bound `{bound}` in bus range `{text}`")]
    InvalidBound { text: String, bound: String },
}

/// Ordered sequence of single-pin names `name<start>` ..= `name<end>`.
///
/// `A[3:0]` counts down, `AL` is `A[0:7]`, `AH` is `A[8:15]` and a bare `A`
/// covers `A[0:15]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BusRange {
    name: String,
    start: i64,
    end: i64,
    step: i64,
    current: i64,
    done: bool,
}

impl BusRange {
    pub fn new<S>(name: S, start: i64, end: i64) -> Self where S: Into<String> {
        Self {
            name: name.into(),
            start,
            end,
            step: if start <= end { 1 } else { -1 },
            current: start,
            done: false,
        }
    }

    /// Full 16-pin bus.
    pub fn whole<S>(name: S) -> Self where S: Into<String> {
        Self::new(name, 0, 15)
    }

    pub fn parse(text: &str) -> Result<Self, BusRangeError> {
        let text = text.trim();

        if let Some(lbracket) = text.find('[') {
            let name = text[.. lbracket].trim();
            let rbracket = text[lbracket ..].find(']')
                .map(|pos| lbracket + pos)
                .ok_or_else(|| BusRangeError::UnclosedBracket(text.to_string()))?;
            let range = &text[lbracket + 1 .. rbracket];
            let (start, end) = range.split_once(':')
                .ok_or_else(|| BusRangeError::MissingColon(text.to_string()))?;

            let parse_bound = |bound: &str| {
                bound.trim().parse::<i64>().map_err(|_| BusRangeError::InvalidBound {
                    text: text.to_string(),
                    bound: bound.trim().to_string(),
                })
            };

            return Ok(Self::new(name, parse_bound(start)?, parse_bound(end)?));
        }

        let (head, last) = match text.char_indices().last() {
            Some((idx, c)) => (&text[.. idx], c),
            None => return Ok(Self::whole(text)),
        };

        Ok(match last {
            'l' | 'L' => Self::new(head, 0, 7),
            'h' | 'H' => Self::new(head, 8, 15),
            _ => Self::whole(text),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }
}

impl Iterator for BusRange {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = format!("{}{}", self.name, self.current);
        if self.current == self.end {
            self.done = true;
        } else {
            self.current += self.step;
        }

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.done { 0 } else { (self.end - self.current).unsigned_abs() as usize + 1 };
        (left, Some(left))
    }
}

impl ExactSizeIterator for BusRange {}

impl std::fmt::Display for BusRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}:{}]", self.name, self.start, self.end)
    }
}
