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

use std::collections::HashSet;

use thiserror::Error;

use super::*;
use crate::common::EOL;
#[allow(unused)]
use crate::log::*;
use crate::parsing::{BoardDefinitionParser, ParseError};
use crate::strings::{CaselessMap, CaselessString};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("cyclic board inheritance involving: {}", .0.join(", "))]
    InheritanceCycle(Vec<String>),
    /// A cycle found in a source that also stopped parsing early.
    #[error("{cycle}{}{diagnostic}", EOL)]
    PartialWithCycle { cycle: Box<CatalogError>, diagnostic: ParseError },
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BoardKind {
    Board,
    Wing,
}

/// Name-keyed view over the arena. Registering a name again only moves the
/// name; the board previously holding it stays in the arena untouched.
#[derive(Default)]
struct Registry {
    by_name: CaselessMap<BoardId>,
    /* registration order, for listing */
    order: Vec<BoardId>,
}

impl Registry {
    fn insert(&mut self, board: &Board, id: BoardId) {
        for name in &board.names {
            self.by_name.insert(CaselessString::new(name.as_str()), id);
        }
        self.order.push(id);
    }

    fn get(&self, name: &str) -> Option<BoardId> {
        self.by_name.get(&CaselessString::new(name)).copied()
    }

    /// Boards still reachable by at least one name, each once.
    fn boards(&self) -> Vec<BoardId> {
        let live: HashSet<BoardId> = self.by_name.values().copied().collect();
        let mut seen = HashSet::new();
        self.order.iter()
            .copied()
            .filter(|id| live.contains(id) && seen.insert(*id))
            .collect()
    }
}

/// Result of loading one definition source.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub registered: Vec<BoardId>,
    /// Set when the source only parsed partially.
    pub diagnostic: Option<ParseError>,
}

/// Owns every board loaded during a run.
#[derive(Default)]
pub struct Catalog {
    arena: Vec<Board>,
    parents: Vec<Option<BoardId>>,
    boards: Registry,
    wings: Registry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self, kind: BoardKind) -> &Registry {
        match kind {
            BoardKind::Board => &self.boards,
            BoardKind::Wing => &self.wings,
        }
    }

    fn registry_mut(&mut self, kind: BoardKind) -> &mut Registry {
        match kind {
            BoardKind::Board => &mut self.boards,
            BoardKind::Wing => &mut self.wings,
        }
    }

    /// Adds a board to the arena and registers all of its names. Call
    /// [`Catalog::link`] once a batch of registrations is done.
    pub fn register(&mut self, mut board: Board, kind: BoardKind) -> BoardId {
        if kind == BoardKind::Wing {
            board.is_wing = true;
        }

        let id = BoardId(self.arena.len());
        self.registry_mut(kind).insert(&board, id);
        self.arena.push(board);
        self.parents.push(None);

        id
    }

    /// Parses `source`, registers whatever boards it yields and relinks
    /// parents. A grammar error is not fatal: it comes back in the summary
    /// next to the boards that did parse.
    pub fn load_source(&mut self, source: &str, kind: BoardKind)
        -> Result<LoadSummary, CatalogError>
    {
        let outcome = BoardDefinitionParser::parse(source);

        let registered = outcome.boards.into_iter()
            .map(|board| self.register(board, kind))
            .collect();

        if let Err(cycle) = self.link() {
            return Err(match outcome.diagnostic {
                Some(diagnostic) => CatalogError::PartialWithCycle { cycle: Box::new(cycle), diagnostic },
                None => cycle,
            });
        }

        Ok(LoadSummary { registered, diagnostic: outcome.diagnostic })
    }

    /// Resolves every parent name to a board id. A board's own registry is
    /// searched first, then the board registry.
    ///
    /// Cycles are cut at the board where they close and reported.
    pub fn link(&mut self) -> Result<(), CatalogError> {
        for idx in 0 .. self.arena.len() {
            let board = &self.arena[idx];
            let kind = if board.is_wing { BoardKind::Wing } else { BoardKind::Board };
            self.parents[idx] = board.parent_name.as_ref().and_then(|name| {
                self.registry(kind).get(name).or_else(|| self.boards.get(name))
            });
        }

        let mut cyclic = Vec::new();
        for idx in 0 .. self.arena.len() {
            let mut visited = HashSet::new();
            let mut current = BoardId(idx);
            visited.insert(current);
            while let Some(parent) = self.parents[current.0] {
                if !visited.insert(parent) {
                    cyclic.push(self.arena[current.0].primary_name().to_string());
                    self.parents[current.0] = None;
                    break;
                }
                current = parent;
            }
        }

        if cyclic.is_empty() {
            Ok(())
        } else {
            dbg_log!(DBG_WARN, "Cut cyclic inheritance at {:?}", cyclic);
            Err(CatalogError::InheritanceCycle(cyclic))
        }
    }

    pub fn find(&self, kind: BoardKind, name: &str) -> Option<BoardId> {
        self.registry(kind).get(name)
    }

    /// Looks a name up among boards first, then wings.
    pub fn find_any(&self, name: &str) -> Option<BoardId> {
        self.boards.get(name).or_else(|| self.wings.get(name))
    }

    pub fn contains(&self, kind: BoardKind, name: &str) -> bool {
        self.find(kind, name).is_some()
    }

    pub fn board(&self, id: BoardId) -> &Board {
        &self.arena[id.0]
    }

    pub fn board_mut(&mut self, id: BoardId) -> &mut Board {
        &mut self.arena[id.0]
    }

    /// Distinct registered boards of a kind, in registration order.
    pub fn boards(&self, kind: BoardKind) -> Vec<BoardId> {
        self.registry(kind).boards()
    }

    pub fn parent(&self, id: BoardId) -> Option<BoardId> {
        self.parents[id.0]
    }

    /// `id` and its ancestors, root first.
    pub fn inheritance_chain(&self, id: BoardId) -> Vec<BoardId> {
        let mut chain = vec![id];
        let mut current = id;
        /* link() guarantees termination; the bound guards an unlinked catalog */
        while let Some(parent) = self.parents[current.0] {
            if chain.len() > self.arena.len() || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Every bus visible from `id`: each level's own buses, root level first.
    /// Same-named buses on different levels all appear.
    pub fn buses(&self, id: BoardId) -> Vec<BusRef> {
        self.inheritance_chain(id).into_iter()
            .flat_map(|board| {
                (0 .. self.arena[board.0].buses.len()).map(move |bus| BusRef { board, bus })
            })
            .collect()
    }

    pub fn bus(&self, bus: BusRef) -> &Bus {
        &self.arena[bus.board.0].buses[bus.bus]
    }

    pub fn bus_mut(&mut self, bus: BusRef) -> &mut Bus {
        &mut self.arena[bus.board.0].buses[bus.bus]
    }

    pub fn bus_count(&self, id: BoardId) -> usize {
        self.inheritance_chain(id).into_iter()
            .map(|board| self.arena[board.0].buses.len())
            .sum()
    }

    /// Distinct bus names, case-insensitively, first spelling kept.
    pub fn bus_names(&self, id: BoardId) -> Vec<String> {
        let mut seen = HashSet::new();
        self.buses(id).into_iter()
            .map(|bus| self.bus(bus).name.clone())
            .filter(|name| seen.insert(name.to_lowercase()))
            .collect()
    }

    pub fn contains_bus_name(&self, id: BoardId, name: &str) -> bool {
        self.inheritance_chain(id).into_iter()
            .any(|board| self.arena[board.0].own_bus(name).is_some())
    }

    /// Position of the named bus in the flattened bus sequence. When several
    /// levels declare the name, the most derived declaration wins.
    pub fn bus_index(&self, id: BoardId, name: &str) -> Option<usize> {
        self.buses(id).into_iter()
            .rposition(|bus| self.bus(bus).has_name(name))
    }

    pub fn bus_by_name(&self, id: BoardId, name: &str) -> Option<BusRef> {
        let buses = self.buses(id);
        self.bus_index(id, name).map(|idx| buses[idx])
    }

    pub fn pins(&self, id: BoardId) -> Vec<PinRef> {
        self.buses(id).into_iter()
            .flat_map(|slot| {
                (0 .. self.bus(slot).pin_count()).map(move |index| PinRef { slot, index })
            })
            .collect()
    }

    pub fn pin(&self, pin: PinRef) -> &Pin {
        &self.bus(pin.slot).pins[pin.index]
    }

    pub fn pin_view(&self, pin: PinRef) -> PinView<'_> {
        PinView::new(self, pin)
    }

    /// Configs of every level, root first, duplicates kept.
    pub fn configs(&self, id: BoardId) -> Vec<Assignment> {
        self.inheritance_chain(id).into_iter()
            .flat_map(|board| self.arena[board.0].configs.iter().cloned())
            .collect()
    }

    /// Header text of every level, root first, each followed by `EOL`.
    pub fn header(&self, id: BoardId) -> String {
        self.inheritance_chain(id).into_iter()
            .filter_map(|board| self.arena[board.0].header.as_ref())
            .fold(String::new(), |text, header| text + header + EOL)
    }
}
