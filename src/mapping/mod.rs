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

//! Pairs the physical pins of two boards through their header names.


use std::collections::HashMap;

use crate::common::{split_commas, split_transform};
#[allow(unused)]
use crate::log::*;
use crate::model::{BoardId, BusRange, BusRangeError, Catalog, PinView};
use crate::strings::{caseless_get, CaselessMap, CaselessString};

/// Header-name renames collected from move directives. Later directives
/// override earlier ones for the same name.
#[derive(Clone, Debug, Default)]
pub struct TranslationTable {
    moves: CaselessMap<String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `A->B`, `AL->AH,BH->BL`, `A[15:0]->A[0:15]` style directives.
    /// Both sides are expanded and paired position by position; the longer
    /// side's extra names are dropped.
    pub fn add_directive(&mut self, directive: &str) -> Result<(), BusRangeError> {
        for command in split_commas(directive) {
            let (from, to) = split_transform(command);
            let from = BusRange::parse(from)?;
            let to = BusRange::parse(to)?;

            dbg_log!(DBG_EXTRA, "Move {} -> {}", from, to);

            for (source, destination) in from.zip(to) {
                self.moves.insert(CaselessString::new(source), destination);
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        caseless_get(&self.moves, name).map(String::as_str)
    }

    /// `name` after translation.
    pub fn translate<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Maps every physical pin of `source` to the physical pin of `dest` sitting
/// under the same (possibly translated) header name. Source pins with no
/// counterpart are left out.
pub fn pin_map(catalog: &Catalog, source: BoardId, dest: BoardId, table: &TranslationTable)
    -> HashMap<String, String>
{
    let mut by_header: CaselessMap<PinView> = CaselessMap::new();
    for pin in catalog.pins(dest) {
        let view = catalog.pin_view(pin);
        by_header.insert(CaselessString::new(view.constraint_name()), view);
    }

    let mut map = HashMap::new();
    for pin in catalog.pins(source) {
        let view = catalog.pin_view(pin);
        let header = view.constraint_name();
        let target = table.translate(&header);

        let source_name = match view.physical_name() {
            Some(name) => name,
            None => continue,
        };

        match caseless_get(&by_header, target).and_then(|dest| dest.physical_name()) {
            Some(dest_name) => {
                map.insert(source_name.to_string(), dest_name.to_string());
            }
            None => {
                dbg_log!(DBG_EXTRA, "Dropping {} ({}): no {} on destination", source_name, header, target);
            }
        }
    }

    map
}
