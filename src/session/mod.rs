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

//! The step pipeline run by the command line tool.

#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::common::{TextTable, EOL};
use crate::exporter::{BoardSummary, CompoundExporter, ExportError, ExportFormat, Exporter};
use crate::loader::{read_text, LoadError, BUILTIN_BOARDS, BUILTIN_WINGS};
#[allow(unused)]
use crate::log::*;
use crate::mapping::{pin_map, TranslationTable};
use crate::model::{place_wing, BoardId, BoardKind, BusRangeError, Catalog, CatalogError, WingPlacements};
use crate::ucf::{self, GenerateOptions, PinFilter};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    BusRange(#[from] BusRangeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Unknown board `{0}`")]
    UnknownBoard(String),
    #[error("Unknown wing `{0}`")]
    UnknownWing(String),
    #[error("No board selected")]
    NoBoardSelected,
    #[error("{count} invalid pin(s) in file '{file}'")]
    InvalidPins { file: String, count: usize },
    #[error("Unknown list scope `{0}`")]
    UnknownScope(String),
}

/// What `list` prints.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ListScope {
    Boards,
    Wings,
    All,
}

impl ListScope {
    fn includes(&self, kind: BoardKind) -> bool {
        match self {
            ListScope::All => true,
            ListScope::Boards => kind == BoardKind::Board,
            ListScope::Wings => kind == BoardKind::Wing,
        }
    }
}

impl std::str::FromStr for ListScope {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "*" => Ok(ListScope::All),
            "board" | "boards" => Ok(ListScope::Boards),
            "wing" | "wings" => Ok(ListScope::Wings),
            _ => Err(SessionError::UnknownScope(s.to_string())),
        }
    }
}

/// One unit of work. Steps run in order and the first failing one ends the run.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    LoadDefinitions { path: PathBuf, kind: BoardKind },
    SourceBoard(String),
    DestinationBoard(String),
    /// `from->to` pin moves, unioned with the earlier ones.
    Move(String),
    /// `wing->slot,slot;wing->slot` placements, applied on the next generate.
    PlaceWing(String),
    Transform { input: PathBuf },
    Validate { input: PathBuf },
    Generate { filter: String },
    List(ListScope),
    Export { names: Vec<String>, format: ExportFormat },
}

pub struct Session<W> where W: Write {
    catalog: Catalog,
    source: Option<String>,
    destination: Option<String>,
    moves: TranslationTable,
    placements: WingPlacements,
    options: GenerateOptions,
    out: W,
}

impl<W> Session<W> where W: Write {
    /// A session with an empty catalog.
    pub fn new(out: W) -> Self {
        Self {
            catalog: Catalog::new(),
            source: None,
            destination: None,
            moves: TranslationTable::new(),
            placements: WingPlacements::new(),
            options: GenerateOptions::default(),
            out,
        }
    }

    /// A session preloaded with the definitions shipped with the tool.
    pub fn with_builtins(out: W) -> Result<Self, SessionError> {
        let mut session = Self::new(out);
        session.load_text(BUILTIN_BOARDS, BoardKind::Board)?;
        session.load_text(BUILTIN_WINGS, BoardKind::Wing)?;
        Ok(session)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GenerateOptions) {
        self.options = options;
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Registers the boards defined in `text`. A grammar error is reported
    /// and whatever parsed before it is kept.
    pub fn load_text(&mut self, text: &str, kind: BoardKind) -> Result<usize, SessionError> {
        let summary = self.catalog.load_source(text, kind)?;
        if let Some(diagnostic) = &summary.diagnostic {
            dbg_log!(DBG_CRITICAL, "{}", diagnostic.rendered);
        }
        Ok(summary.registered.len())
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<(), SessionError> {
        for step in steps {
            dbg_log!(DBG_INFO, "Running {:?}", step);
            if let Err(err) = self.execute(step) {
                dbg_log!(DBG_CRITICAL, "{}", err);
                dbg_log!(DBG_CRITICAL, "execution failed");
                return Err(err);
            }
        }
        Ok(())
    }

    fn execute(&mut self, step: &Step) -> Result<(), SessionError> {
        match step {
            Step::LoadDefinitions { path, kind } => {
                let text = read_text(path)?;
                let count = self.load_text(&text, *kind)?;
                dbg_log!(DBG_INFO, "Loaded {} definition(s) from {}", count, path.display());
            }
            Step::SourceBoard(name) => {
                self.board_named(name)?;
                self.source = Some(name.clone());
            }
            Step::DestinationBoard(name) => {
                self.board_named(name)?;
                self.destination = Some(name.clone());
            }
            Step::Move(directive) => self.moves.add_directive(directive)?,
            Step::PlaceWing(directive) => self.placements.add_directive(directive),
            Step::Transform { input } => self.transform(input)?,
            Step::Validate { input } => self.validate(input)?,
            Step::Generate { filter } => self.generate(filter)?,
            Step::List(scope) => self.list(*scope)?,
            Step::Export { names, format } => self.export(names, *format)?,
        }
        Ok(())
    }

    fn board_named(&self, name: &str) -> Result<BoardId, SessionError> {
        self.catalog.find(BoardKind::Board, name)
            .ok_or_else(|| SessionError::UnknownBoard(name.to_string()))
    }

    /// Source board name, falling back to the destination.
    fn source_name(&self) -> Result<&str, SessionError> {
        self.source.as_deref()
            .or(self.destination.as_deref())
            .ok_or(SessionError::NoBoardSelected)
    }

    /// Destination board name, falling back to the source.
    fn destination_name(&self) -> Result<&str, SessionError> {
        self.destination.as_deref()
            .or(self.source.as_deref())
            .ok_or(SessionError::NoBoardSelected)
    }

    fn write(&mut self, text: &str) -> Result<(), SessionError> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Stacks the pending wings onto the destination board.
    fn apply_placements(&mut self, dest: BoardId) -> Result<(), SessionError> {
        let placements = std::mem::take(&mut self.placements);

        for (slot, wing_name) in placements.iter() {
            let wing = self.catalog.find(BoardKind::Wing, wing_name)
                .ok_or_else(|| SessionError::UnknownWing(wing_name.to_string()))?;
            let placed = place_wing(&mut self.catalog, dest, wing, slot);
            dbg_log!(DBG_INFO, "Placed {} bus(es) of {} at {}", placed, wing_name, slot);
        }

        Ok(())
    }

    fn transform(&mut self, input: &Path) -> Result<(), SessionError> {
        let source = self.board_named(self.source_name()?)?;
        let dest = self.board_named(self.destination_name()?)?;

        let text = read_text(input)?;
        let map = pin_map(&self.catalog, source, dest, &self.moves);
        let output = ucf::transform(&text, &map);

        self.write(&output)
    }

    fn validate(&mut self, input: &Path) -> Result<(), SessionError> {
        let board_name = self.source_name()?.to_string();
        let board = self.board_named(&board_name)?;

        let text = read_text(input)?;
        let invalid = ucf::validate(&text, &self.catalog, board);
        let file = input.display().to_string();

        if !invalid.is_empty() {
            return Err(SessionError::InvalidPins { file, count: invalid.len() });
        }

        self.write(&format!("All pins in file '{}' are valid for the {} board{}", file, board_name, EOL))
    }

    fn generate(&mut self, filter: &str) -> Result<(), SessionError> {
        let dest = self.board_named(self.destination_name()?)?;
        self.apply_placements(dest)?;

        let output = ucf::generate(&self.catalog, dest, &PinFilter::parse(filter), &self.options)?;
        self.write(&output)
    }

    fn list(&mut self, scope: ListScope) -> Result<(), SessionError> {
        let mut table = TextTable::with_headers(&["Name", "Type", "Aliases"]);

        for (kind, label) in [(BoardKind::Board, "Board"), (BoardKind::Wing, "Wing")] {
            if !scope.includes(kind) {
                continue;
            }
            for id in self.catalog.boards(kind) {
                let board = self.catalog.board(id);
                table.add_row(vec![
                    board.primary_name().to_string(),
                    label.to_string(),
                    board.aliases().join(", "),
                ]);
            }
        }
        table.sort_by_column(0);

        let output = table.render();
        self.write(&output)
    }

    fn export(&mut self, names: &[String], format: ExportFormat) -> Result<(), SessionError> {
        if !self.placements.is_empty() {
            let dest = self.board_named(self.destination_name()?)?;
            self.apply_placements(dest)?;
        }

        let catalog = &self.catalog;
        let mut exporter = CompoundExporter::new(names, format, &mut self.out);

        for kind in [BoardKind::Board, BoardKind::Wing] {
            for id in catalog.boards(kind) {
                exporter.ignore_or_export(&catalog.board(id).names, || BoardSummary::new(catalog, id))?;
            }
        }

        if exporter.is_empty() {
            dbg_log!(DBG_WARN, "Nothing matched {:?}, exporting an empty list", names);
        }

        Exporter::<BoardSummary>::flush(&mut exporter)?;
        Ok(())
    }
}
