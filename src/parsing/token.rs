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

use super::TokenKind;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BoardTokenKind {
    Eof,
    Whitespace,
    Comment,
    Eol,
    Identifier,
    Number,
    Header,
    Config,
    Comma,
    Colon,
    Equal,
    String,
    MultilineString,
    LCurly,
    RCurly,
    LBracket,
    RBracket,
}

/* Declaration order is the tie-break between kinds. WHITESPACE shadows EOL on
 * purpose: newlines are never significant to the grammar. */
const BOARD_TOKEN_PATTERNS: &'static [(BoardTokenKind, Option<&'static str>)] = &[
    (BoardTokenKind::Eof, None),
    (BoardTokenKind::Whitespace, Some(r"\s+")),
    (BoardTokenKind::Comment, Some(r"#[^\r\n]*$")),
    (BoardTokenKind::Eol, Some(r"\r|\n|\r\n")),
    (BoardTokenKind::Identifier, Some(r"[-_a-zA-Z][-_a-zA-Z0-9]*(?:\([0-9]+\))?")),
    (BoardTokenKind::Number, Some(r"[0-9]+(?:\.[0-9]+)?(?:ns\b)?")),
    (BoardTokenKind::Header, Some(r"@header")),
    (BoardTokenKind::Config, Some(r"@config")),
    (BoardTokenKind::Comma, Some(r",")),
    (BoardTokenKind::Colon, Some(r":")),
    (BoardTokenKind::Equal, Some(r"=")),
    (BoardTokenKind::String, Some(r#""[^"\r\n]*""#)),
    (BoardTokenKind::MultilineString, Some(r"<<.*?>>")),
    (BoardTokenKind::LCurly, Some(r"\{")),
    (BoardTokenKind::RCurly, Some(r"\}")),
    (BoardTokenKind::LBracket, Some(r"\[")),
    (BoardTokenKind::RBracket, Some(r"\]")),
];

lazy_static! {
    static ref BOARD_TOKEN_CATALOG: Vec<(BoardTokenKind, Option<Regex>)> =
        BOARD_TOKEN_PATTERNS.iter()
            .map(|(kind, pattern)| {
                /* Multi-line (CRLF aware) + dot-matches-newline, anchored at the scan offset */
                let compiled = pattern.map(|p| {
                    Regex::new(&format!(r"(?msR)\A(?:{})", p))
                        .expect("built-in token pattern must compile")
                });
                (*kind, compiled)
            })
            .collect();
}

impl TokenKind for BoardTokenKind {
    fn catalog() -> &'static [(Self, Option<Regex>)] {
        BOARD_TOKEN_CATALOG.as_slice()
    }

    fn eof() -> Self {
        BoardTokenKind::Eof
    }

    fn is_filtered(&self) -> bool {
        matches!(self, BoardTokenKind::Whitespace | BoardTokenKind::Comment)
    }
}

impl BoardTokenKind {
    /// Kinds accepted wherever the grammar expects a name.
    pub fn is_name(&self) -> bool {
        matches!(
            self,
            BoardTokenKind::Identifier | BoardTokenKind::String | BoardTokenKind::Number
        )
    }
}
