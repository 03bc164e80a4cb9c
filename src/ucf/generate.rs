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

use crate::common::{split_commas, TextTable, EOL};
#[allow(unused)]
use crate::log::*;
use crate::model::{BoardId, BusRange, BusRangeError, BusRef, Catalog, PinRef, PinView};
use crate::strings::{CaselessSet, CaselessString};

/// Layout switches for generated constraint files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Sort rows by net name.
    pub sorted: bool,
    /// Don't pad the additions column.
    pub collapse_columns: bool,
    /// Leave out header pins no net is routed to.
    pub exclude_unused_pins: bool,
    /// `LOC = "P1"` instead of `LOC="P1"`.
    pub spaces_around_equals: bool,
}

impl GenerateOptions {
    fn equals(&self) -> &'static str {
        if self.spaces_around_equals { " = " } else { "=" }
    }
}

/// Which header pins to emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinFilter {
    All,
    /// Bus names or bus ranges (`CLK`, `A`, `BL`, `C[0:3]`), in output order.
    Only(Vec<String>),
}

impl PinFilter {
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("all") {
            return PinFilter::All;
        }
        PinFilter::Only(split_commas(text).map(str::to_string).collect())
    }

    /// Pins to emit, grouped by bus, in output order.
    pub fn select(&self, catalog: &Catalog, board: BoardId) -> Result<Vec<PinRef>, BusRangeError> {
        let entries = match self {
            PinFilter::All => return Ok(catalog.pins(board)),
            PinFilter::Only(entries) => entries,
        };

        /* per bus, in first-mention order: which slots were asked for */
        let mut selection: Vec<(BusRef, Vec<bool>)> = Vec::new();

        for entry in entries {
            let (bus, names) = match catalog.bus_by_name(board, entry) {
                Some(bus) => (bus, None),
                None => {
                    let range = BusRange::parse(entry)?;
                    match catalog.bus_by_name(board, range.name()) {
                        Some(bus) => {
                            let names: CaselessSet = range.map(CaselessString::from).collect();
                            (bus, Some(names))
                        }
                        None => {
                            dbg_log!(DBG_INFO, "Nothing on {} matches `{}`",
                                     catalog.board(board).primary_name(), entry);
                            continue;
                        }
                    }
                }
            };

            let idx = match selection.iter().position(|(slot, _)| *slot == bus) {
                Some(idx) => idx,
                None => {
                    selection.push((bus, vec![false; catalog.bus(bus).pin_count()]));
                    selection.len() - 1
                }
            };

            for (index, chosen) in selection[idx].1.iter_mut().enumerate() {
                let wanted = match &names {
                    None => true,
                    Some(names) => {
                        let canonical = catalog.pin_view(PinRef { slot: bus, index }).canonical_name();
                        names.contains(&CaselessString::new(canonical))
                    }
                };
                *chosen |= wanted;
            }
        }

        Ok(selection.into_iter()
            .flat_map(|(slot, chosen)| {
                chosen.into_iter()
                    .enumerate()
                    .filter(|(_, chosen)| *chosen)
                    .map(move |(index, _)| PinRef { slot, index })
            })
            .collect())
    }
}

const NET_COLUMN: usize = 0;
const ADDITIONS_COLUMN: usize = 2;

fn pin_row(view: &PinView, options: &GenerateOptions) -> Option<Vec<String>> {
    let canonical = view.canonical_name();
    let physical = view.physical_name();

    let net = match (view.net_name(), physical) {
        (Some(net), Some(_)) => format!("NET {}", net),
        _ if options.exclude_unused_pins => return None,
        _ => format!("#NET {}", canonical),
    };

    let loc = format!("LOC{}\"{}\"", options.equals(), physical.unwrap_or(""));

    let additions = view.additions();
    let additions = if additions.is_empty() {
        String::new()
    } else {
        let items: Vec<_> = additions.iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{}{}{}", key, options.equals(), value),
                None => key.clone(),
            })
            .collect();
        format!("| {};", items.join(" | "))
    };

    Some(vec![net, loc, additions, format!("# {}", canonical)])
}

/// Configuration lines, followed by a blank line when there are any.
fn configs_text(catalog: &Catalog, board: BoardId, options: &GenerateOptions) -> String {
    let configs = catalog.configs(board);
    let mut output = String::new();

    for (key, value) in &configs {
        match value {
            Some(value) => output.push_str(&format!("CONFIG {}{}{};", key, options.equals(), value)),
            None => output.push_str(&format!("CONFIG {};", key)),
        }
        output.push_str(EOL);
    }
    if !configs.is_empty() {
        output.push_str(EOL);
    }

    output
}

/// Writes a constraint file for the header pins of `board` that `filter`
/// selects: header comment, configs, then one aligned row per pin.
pub fn generate(
    catalog: &Catalog,
    board: BoardId,
    filter: &PinFilter,
    options: &GenerateOptions,
) -> Result<String, BusRangeError> {
    let mut output = String::new();

    let header = catalog.header(board);
    if !header.is_empty() {
        output.push_str(&header);
        output.push_str(EOL);
    }

    output.push_str(&configs_text(catalog, board, options));

    let mut table = TextTable::new();
    for pin in filter.select(catalog, board)? {
        if let Some(row) = pin_row(&catalog.pin_view(pin), options) {
            table.add_row(row);
        }
    }

    if options.sorted {
        table.sort_by_column(NET_COLUMN);
    }
    if options.collapse_columns {
        table.collapse(ADDITIONS_COLUMN);
    }
    output.push_str(&table.render());

    dbg_log!(DBG_INFO, "Generated {} row(s) for {}", table.len(), catalog.board(board).primary_name());

    Ok(output)
}
