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

use regex::Regex;

/// Line terminator used for everything this crate emits.
pub const EOL: &str = "\n";

/// Separates the two sides of move and wing-placement directives.
pub const TRANSFORM_DELIMITER: &str = "->";

lazy_static! {
    static ref EOL_PATTERN: Regex = Regex::new(r"\r\n|\r|\n").unwrap();
    static ref COMMA_DELIMITER_PATTERN: Regex = Regex::new(r"\s*,\s*").unwrap();
    static ref SEMICOLON_DELIMITER_PATTERN: Regex = Regex::new(r"\s*;\s*").unwrap();
}

/// Splits text into lines on CR, LF or CRLF. A terminator at the very end does
/// not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = EOL_PATTERN.split(text).collect();
    if lines.len() > 1 && lines.last() == Some(&"") {
        lines.pop();
    }
    if text.is_empty() {
        lines.clear();
    }
    lines
}

/// Trims every line and rejoins them with `EOL`.
pub fn trim_lines(text: &str) -> String {
    EOL_PATTERN.split(text)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(EOL)
}

pub fn split_commas(text: &str) -> impl Iterator<Item = &str> {
    COMMA_DELIMITER_PATTERN.split(text.trim()).filter(|s| !s.is_empty())
}

pub fn split_semicolons(text: &str) -> impl Iterator<Item = &str> {
    SEMICOLON_DELIMITER_PATTERN.split(text.trim()).filter(|s| !s.is_empty())
}

/// Splits `source->destination`. A bare `name` is shorthand for `name->name`.
pub fn split_transform(text: &str) -> (&str, &str) {
    match text.split_once(TRANSFORM_DELIMITER) {
        Some((from, to)) => (from.trim(), to.trim()),
        None => (text.trim(), text.trim()),
    }
}

/// Left-aligned text columns separated by a single space. Trailing blanks are
/// trimmed from every line.
#[derive(Clone, Debug, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /* printed unpadded, left out entirely when empty */
    collapsed: Option<usize>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a heading line underlined by `=`.
    pub fn with_headers(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn collapse(&mut self, column: usize) {
        self.collapsed = Some(column);
    }

    /// Stable, case-insensitive.
    pub fn sort_by_column(&mut self, column: usize) {
        self.rows.sort_by_key(|row| row.get(column).map(|c| c.to_lowercase()).unwrap_or_default());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, column) in row.iter().enumerate() {
                let width = column.chars().count();
                match widths.get_mut(idx) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    fn render_line(&self, columns: &[String], widths: &[usize], output: &mut String) {
        let mut line = String::new();
        for (idx, column) in columns.iter().enumerate() {
            if self.collapsed == Some(idx) {
                if column.is_empty() {
                    continue;
                }
                line.push_str(column);
            } else {
                line.push_str(&format!("{:<width$}", column, width = widths[idx]));
            }
            line.push(' ');
        }
        output.push_str(line.trim_end());
        output.push_str(EOL);
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut output = String::new();

        if !self.headers.is_empty() {
            self.render_line(&self.headers, &widths, &mut output);
            let underline: Vec<String> = widths.iter()
                .take(self.headers.len())
                .map(|width| "=".repeat(*width))
                .collect();
            self.render_line(&underline, &widths, &mut output);
        }

        for row in &self.rows {
            self.render_line(row, &widths, &mut output);
        }

        output
    }
}

impl std::fmt::Display for TextTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
