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
use replace_with::replace_with_or_abort;

use super::*;
use crate::common::{split_commas, split_semicolons, TRANSFORM_DELIMITER};
#[allow(unused)]
use crate::log::*;
use crate::strings::CaselessString;

lazy_static! {
    static ref PLACEMENT_TOKEN: Regex = Regex::new(r"^([^0-9\r\n\s]+)([0-9]+)$").unwrap();
}

/// Splits `B12` into (`B`, 12). Tokens without a numeric tail start at 0.
fn split_placement_token(token: &str) -> (&str, usize) {
    PLACEMENT_TOKEN.captures(token)
        .and_then(|caps| {
            let name = caps.get(1)?.as_str();
            let offset = caps.get(2)?.as_str().parse().ok()?;
            Some((name, offset))
        })
        .unwrap_or((token, 0))
}

/// Stacks the buses of `wing` onto `dest`, starting at the slot named by
/// `token` (`B`, `B8`, ...). Each wing bus lands on the next destination bus;
/// one that does not fit is skipped and leaves the destination untouched.
///
/// Returns the number of wing buses placed.
pub fn place_wing(catalog: &mut Catalog, dest: BoardId, wing: BoardId, token: &str) -> usize {
    let (bus_name, mut offset) = split_placement_token(token);

    let mut bus_index = match catalog.bus_index(dest, bus_name) {
        Some(idx) => idx,
        None => {
            dbg_log!(DBG_INFO, "No bus {} on {}, wing not placed", bus_name,
                     catalog.board(dest).primary_name());
            return 0;
        }
    };

    let dest_buses = catalog.buses(dest);
    let wing_buses = catalog.buses(wing);
    let mut placed = 0;

    for wing_bus in wing_buses {
        let slot = match dest_buses.get(bus_index) {
            Some(slot) => *slot,
            None => break,
        };

        let wing_pins = catalog.bus(wing_bus).pins.clone();
        let room = catalog.bus(slot).pin_count();

        let fits = offset.checked_add(wing_pins.len()).map_or(false, |end| end <= room);

        if fits {
            let pins = &mut catalog.bus_mut(slot).pins;
            for (wing_pin, pin) in wing_pins.iter().zip(pins[offset ..].iter_mut()) {
                replace_with_or_abort(pin, |below| wing_pin.stacked_onto(wing_bus, below));
            }
            placed += 1;
        } else {
            dbg_log!(DBG_INFO, "Wing bus {} ({} pins) does not fit at {}{}, skipped",
                     catalog.bus(wing_bus).name, wing_pins.len(),
                     catalog.bus(slot).name, offset);
        }

        offset = 0;
        bus_index += 1;
    }

    placed
}

/// Pending wing placements keyed by normalized destination slot, in the order
/// they were first requested.
#[derive(Clone, Debug, Default)]
pub struct WingPlacements {
    entries: Vec<(CaselessString, String)>,
}

impl WingPlacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// `AL` -> `A0`, `AH` -> `A8`, anything else gets a `0` appended.
    pub fn normalize_destination(dest: &str) -> String {
        match dest.chars().last() {
            Some('l') | Some('L') => format!("{}0", &dest[.. dest.len() - 1]),
            Some('h') | Some('H') => format!("{}8", &dest[.. dest.len() - 1]),
            _ => format!("{}0", dest),
        }
    }

    /// Records one slot. A slot placed twice keeps the later wing.
    pub fn add(&mut self, dest: &str, wing: &str) {
        let key = CaselessString::new(dest);

        match self.entries.iter_mut().find(|(slot, _)| *slot == key) {
            Some(entry) => {
                dbg_log!(DBG_WARN, "Wing {} will override wing {} at header pin {}", wing, entry.1, dest);
                entry.1 = wing.to_string();
            }
            None => self.entries.push((key, wing.to_string())),
        }
    }

    /// Adds every placement of a `wing->dest,dest;wing->dest` directive.
    /// Entries without `->` are ignored.
    pub fn add_directive(&mut self, directive: &str) {
        for placement in split_semicolons(directive) {
            let (wing, dests) = match placement.split_once(TRANSFORM_DELIMITER) {
                Some((wing, dests)) => (wing.trim(), dests.trim()),
                None => continue,
            };

            for dest in split_commas(dests) {
                self.add(&Self::normalize_destination(dest), wing);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// (slot, wing name) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(slot, wing)| (slot.as_str(), wing.as_str()))
    }
}
