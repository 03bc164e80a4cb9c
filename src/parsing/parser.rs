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

//! Recursive-descent parser for board definition files.
//!
//! ```text
//! Boards         := Board*
//! Board          := Names (':' Name)? '{' Header? Config? Bus* '}'
//! Names          := Name (',' Name)*
//! Bus            := Name ('{' Assignments '}')? (':' Pin (',' Pin)*)?
//! Pin            := Name? ('{' Assignments '}')?
//! Assignments    := Assignment (',' Assignment)*
//! Assignment     := Name ('=' Name)?
//! Header         := '@header' MULTILINE_STRING
//! Config         := '@config' '{' Assignments '}'
//! Name           := IDENTIFIER | STRING | NUMBER
//! ```

use thiserror::Error;

use super::{BoardTokenKind, ErrorReporter, Lexeme, Lexer};
use crate::common::trim_lines;
use crate::model::{Additions, Assignment, Board, Bus, Pin};
#[allow(unused)]
use crate::log::*;

/// A grammar diagnostic with its rendered source excerpt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{rendered}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
    pub rendered: String,
}

/// Everything a parse produced. A failed parse still hands back the boards
/// completed before the failure.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub boards: Vec<Board>,
    pub diagnostic: Option<ParseError>,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        self.diagnostic.is_none()
    }

    pub fn into_result(self) -> Result<Vec<Board>, ParseError> {
        match self.diagnostic {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(self.boards),
        }
    }
}

type PResult<T> = Result<T, ParseError>;

pub struct BoardDefinitionParser<'s> {
    lexer: Lexer<'s, BoardTokenKind>,
}

impl<'s> BoardDefinitionParser<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { lexer: Lexer::new(source) }
    }

    /// Parses a whole source text.
    pub fn parse(source: &'s str) -> ParseOutcome {
        let mut parser = Self::new(source);
        parser.parse_source()
    }

    fn parse_source(&mut self) -> ParseOutcome {
        let mut boards = Vec::new();

        /* prime the lexer */
        self.advance();
        let diagnostic = self.parse_board_definitions(&mut boards).err();

        if let Some(diagnostic) = &diagnostic {
            dbg_log!(DBG_INFO, "Parse stopped after {} board(s): {}", boards.len(), diagnostic.message);
        }

        ParseOutcome { boards, diagnostic }
    }

    fn current(&self) -> Lexeme<'s, BoardTokenKind> {
        self.lexer.current()
    }

    fn advance(&mut self) -> Lexeme<'s, BoardTokenKind> {
        self.lexer.advance()
    }

    fn is_type(&self, kind: BoardTokenKind) -> bool {
        self.current().kind == kind
    }

    fn is_name(&self) -> bool {
        self.current().kind.is_name()
    }

    fn error<T>(&self, message: &str) -> PResult<T> {
        let current = self.current();
        /* Point at the lexeme we choked on, or where scanning gave up */
        let offset = if current.is_eof() { self.lexer.offset() } else { current.offset };
        let reporter = ErrorReporter::new(self.lexer.source(), offset);

        Err(ParseError {
            offset,
            message: message.to_string(),
            rendered: reporter.error_message(message),
        })
    }

    fn expect(&mut self, kind: BoardTokenKind, message: &str) -> PResult<()> {
        if self.is_type(kind) {
            self.advance();
            Ok(())
        } else {
            self.error(message)
        }
    }

    /* Boards := Board* */
    fn parse_board_definitions(&mut self, boards: &mut Vec<Board>) -> PResult<()> {
        while !self.current().is_eof() {
            let before = self.current();

            boards.push(self.parse_board_definition()?);

            /* break a possible infinite loop if the lexer didn't advance */
            let after = self.current();
            if before.offset == after.offset && before.kind == after.kind {
                break;
            }
        }

        if self.lexer.stalled() {
            return self.error("Unrecognized input");
        }

        Ok(())
    }

    /* Board := Names (':' Name)? '{' Header? Config? Bus* '}' */
    fn parse_board_definition(&mut self) -> PResult<Board> {
        let mut board = Board::new();

        for name in self.parse_names()? {
            board.add_name(name);
        }

        if self.is_type(BoardTokenKind::Colon) {
            self.advance();
            board.parent_name = Some(self.parse_name()?);
        }

        self.expect(
            BoardTokenKind::LCurly,
            "A board definition should start with a left curly brace",
        )?;

        if self.is_type(BoardTokenKind::Header) {
            board.header = Some(self.parse_header()?);
        }

        if self.is_type(BoardTokenKind::Config) {
            board.configs = self.parse_configs()?;
        }

        board.buses = self.parse_buses()?;

        self.expect(
            BoardTokenKind::RCurly,
            "A board definition should end with a right curly brace",
        )?;

        dbg_log!(DBG_EXTRA, "Parsed board {:?} with {} bus(es)", board.names, board.buses.len());

        Ok(board)
    }

    /* Header := '@header' MULTILINE_STRING */
    fn parse_header(&mut self) -> PResult<String> {
        self.expect(BoardTokenKind::Header, "Expected @header")?;

        if !self.is_type(BoardTokenKind::MultilineString) {
            return self.error("Expected multi-line string after @header");
        }

        let text = self.current().text;
        /* strip the << >> delimiters */
        let body = &text[2 .. text.len() - 2];
        let header = trim_lines(body.trim());
        self.advance();

        Ok(header)
    }

    /* Config := '@config' '{' Assignments '}' */
    fn parse_configs(&mut self) -> PResult<Vec<Assignment>> {
        self.expect(BoardTokenKind::Config, "Expected @config")?;
        self.expect(BoardTokenKind::LCurly, "A configuration block must start with '{'")?;
        let configs = self.parse_assignments()?;
        self.expect(BoardTokenKind::RCurly, "A configuration block must end with '}'")?;

        Ok(configs)
    }

    /* Bus := Name ('{' Assignments '}')? (':' Pin (',' Pin)*)? */
    fn parse_buses(&mut self) -> PResult<Vec<Bus>> {
        let mut buses = Vec::new();

        while self.is_name() {
            let mut bus = Bus::new(self.parse_name()?);

            if self.is_type(BoardTokenKind::LCurly) {
                self.advance();
                bus.additions = self.parse_assignments()?.into_iter().collect();
                self.expect(BoardTokenKind::RCurly, "A right curly brace must close bus additions")?;
            }

            if self.is_type(BoardTokenKind::Colon) {
                self.advance();
                bus.pins = self.parse_fpga_pins()?;
            }

            buses.push(bus);
        }

        Ok(buses)
    }

    fn parse_fpga_pins(&mut self) -> PResult<Vec<Pin>> {
        let mut pins = vec![self.parse_fpga_pin()?];

        while self.is_type(BoardTokenKind::Comma) {
            self.advance();
            pins.push(self.parse_fpga_pin()?);
        }

        Ok(pins)
    }

    /* Pin := Name? ('{' Assignments '}')? */
    fn parse_fpga_pin(&mut self) -> PResult<Pin> {
        let mut pin = Pin::default();

        /* A missing name marks a pin that is not connected */
        if self.is_name() {
            pin.name = Some(self.parse_name()?);
        }

        if self.is_type(BoardTokenKind::LCurly) {
            self.advance();
            let additions: Additions = self.parse_assignments()?.into_iter().collect();
            self.expect(BoardTokenKind::RCurly, "A right curly brace must close pin additions")?;
            pin.additions = additions;
        }

        Ok(pin)
    }

    /* Assignments := Assignment (',' Assignment)* */
    fn parse_assignments(&mut self) -> PResult<Vec<Assignment>> {
        let mut assignments = vec![self.parse_assignment()?];

        while self.is_type(BoardTokenKind::Comma) {
            self.advance();
            assignments.push(self.parse_assignment()?);
        }

        Ok(assignments)
    }

    /* Assignment := Name ('=' Name)? */
    fn parse_assignment(&mut self) -> PResult<Assignment> {
        if !self.is_name() {
            return self.error("An assignment must begin with a valid name type");
        }

        let name = self.parse_name()?;
        let value = if self.is_type(BoardTokenKind::Equal) {
            self.advance();
            Some(self.parse_name()?)
        } else {
            None
        };

        Ok((name, value))
    }

    /* Names := Name (',' Name)* */
    fn parse_names(&mut self) -> PResult<Vec<String>> {
        let mut names = vec![self.parse_name()?];

        while self.is_type(BoardTokenKind::Comma) {
            self.advance();
            names.push(self.parse_name()?);
        }

        Ok(names)
    }

    fn parse_name(&mut self) -> PResult<String> {
        if !self.is_name() {
            return self.error("Expected an identifier or string");
        }

        let text = self.current().text;
        let name = if self.is_type(BoardTokenKind::String) {
            text[1 .. text.len() - 1].to_string()
        } else {
            text.to_string()
        };
        self.advance();

        Ok(name)
    }
}
