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

use crate::common::EOL;

fn is_line_break(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Renders a source line with a caret under a byte offset.
pub struct ErrorReporter<'s> {
    source: &'s str,
    offset: usize,
    line_start: usize,
    line_end: usize,
}

impl<'s> ErrorReporter<'s> {
    pub fn new(source: &'s str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let line_start = Self::find_start_of_line(source, offset);
        Self {
            source,
            offset,
            line_start,
            line_end: Self::find_end_of_line(source, line_start),
        }
    }

    fn find_start_of_line(source: &str, offset: usize) -> usize {
        let bytes = source.as_bytes();
        if bytes.is_empty() {
            return 0;
        }
        /* A caret sitting on a line break belongs to the line it terminates */
        let start = offset.min(bytes.len() - 1);
        let mut pos = start;
        while pos > 0 {
            if is_line_break(bytes[pos - 1]) && pos - 1 != start {
                return pos;
            }
            pos -= 1;
        }
        0
    }

    fn find_end_of_line(source: &str, offset: usize) -> usize {
        let bytes = source.as_bytes();
        let mut pos = offset;
        while pos < bytes.len() && !is_line_break(bytes[pos]) {
            pos += 1;
        }
        pos
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> &'s str {
        &self.source[self.line_start .. self.line_end]
    }

    /// Leading whitespace is copied verbatim so tabs line up, everything else
    /// up to the end of the line becomes `-`, with `^` at the offset.
    pub fn marker_line(&self) -> String {
        let start = self.line_start;
        let mut marker = String::new();
        let mut in_whitespace = true;

        for (idx, c) in self.source[start .. self.line_end].char_indices() {
            if start + idx == self.offset {
                marker.push('^');
            } else if in_whitespace && c.is_whitespace() {
                marker.push(c);
            } else {
                in_whitespace = false;
                marker.push('-');
            }
        }

        /* Offsets at the end of a line (or of the input) still get a caret */
        if self.offset >= self.line_end {
            marker.push('^');
        }

        marker
    }

    pub fn error_message(&self, message: &str) -> String {
        format!(
            "At offset {}: {}{}{}{}{}",
            self.offset, message, EOL, self.line(), EOL, self.marker_line()
        )
    }
}
