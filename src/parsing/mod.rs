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

pub mod error_reporter;
pub mod parser;
pub mod token;

use regex::Regex;

pub use self::error_reporter::ErrorReporter;
pub use self::parser::{BoardDefinitionParser, ParseError, ParseOutcome};
pub use self::token::BoardTokenKind;

/// A finite, ordered set of lexical categories.
///
/// `catalog` lists every kind in declaration order together with its pattern.
/// The order is significant: the lexer tries kinds front to back and the first
/// one matching at the current offset wins, regardless of match length.
pub trait TokenKind: Copy + Eq + std::fmt::Debug + 'static {
    fn catalog() -> &'static [(Self, Option<Regex>)];
    fn eof() -> Self;
    /// Kinds that are matched but never handed to the parser.
    fn is_filtered(&self) -> bool;
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Lexeme<'s, T> where T: TokenKind {
    pub kind: T,
    pub offset: usize,
    pub length: usize,
    pub text: &'s str,
}

impl<'s, T> Lexeme<'s, T> where T: TokenKind {
    /// The end-of-input sentinel. `offset` records where scanning stopped.
    pub fn eof(offset: usize) -> Self {
        Self { kind: T::eof(), offset, length: 0, text: "" }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == T::eof()
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl<'s, T> std::fmt::Debug for Lexeme<'s, T> where T: TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{},{}) ~{}~", self.kind, self.offset, self.end(), self.text)
    }
}

/// Pattern-driven scanner generic over the token kind.
pub struct Lexer<'s, T> where T: TokenKind {
    source: &'s str,
    offset: usize,
    current: Lexeme<'s, T>,
}

impl<'s, T> Lexer<'s, T> where T: TokenKind {
    pub fn new(source: &'s str) -> Self {
        Self { source, offset: 0, current: Lexeme::eof(0) }
    }

    pub fn set_source(&mut self, source: &'s str) {
        self.source = source;
        self.offset = 0;
        self.current = Lexeme::eof(0);
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn current(&self) -> Lexeme<'s, T> {
        self.current
    }

    pub fn has_next(&self) -> bool {
        self.offset < self.source.len() && !self.current.is_eof()
    }

    /// Matches exactly one lexeme at the current offset, filtered kinds included.
    ///
    /// When no kind matches at a non-end offset, EOF is returned and the offset
    /// is left where it is. The parser decides whether that is an error.
    pub fn next_lexeme(&mut self) -> Lexeme<'s, T> {
        if self.offset >= self.source.len() {
            return Lexeme::eof(self.offset);
        }

        let rest = &self.source[self.offset ..];
        for (kind, pattern) in T::catalog() {
            let pattern = match pattern {
                Some(pattern) => pattern,
                None => continue,
            };
            /* Patterns are compiled with a leading \A, so a hit always starts at 0 */
            if let Some(m) = pattern.find(rest) {
                if m.start() != 0 || m.end() == 0 {
                    continue;
                }
                let lexeme = Lexeme {
                    kind: *kind,
                    offset: self.offset,
                    length: m.end(),
                    text: &rest[.. m.end()],
                };
                self.offset += m.end();
                return lexeme;
            }
        }

        Lexeme::eof(self.offset)
    }

    /// Moves to the next lexeme the parser cares about and makes it current.
    pub fn advance(&mut self) -> Lexeme<'s, T> {
        loop {
            let lexeme = self.next_lexeme();
            if lexeme.is_eof() || !lexeme.kind.is_filtered() {
                self.current = lexeme;
                break;
            }
        }
        self.current
    }

    /// True when scanning stopped on input no token kind recognizes.
    pub fn stalled(&self) -> bool {
        self.current.is_eof() && self.offset < self.source.len()
    }
}
