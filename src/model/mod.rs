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

pub mod bus_range;
pub mod catalog;
pub mod view;
pub mod wing;
#[cfg(test)]
mod tests;

pub use self::bus_range::{BusRange, BusRangeError};
pub use self::catalog::{BoardKind, Catalog, CatalogError, LoadSummary};
pub use self::view::PinView;
pub use self::wing::{place_wing, WingPlacements};

/// A `key` or `key=value` pair from an assignment list.
pub type Assignment = (String, Option<String>);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct BoardId(pub(crate) usize);

impl BoardId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Addresses a bus by its owning board and its position among that board's
/// own (not inherited) buses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BusRef {
    pub board: BoardId,
    pub bus: usize,
}

/// Addresses a pin slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PinRef {
    pub slot: BusRef,
    pub index: usize,
}

/// Ordered key/optional-value map. Re-inserting a key replaces its value in
/// place.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Additions(Vec<Assignment>);

impl Additions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: String, value: Option<String>) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Option<String>> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.0.iter()
    }

    /// `self` overridden key by key with `other`.
    pub fn merged_with(&self, other: &Additions) -> Additions {
        let mut merged = self.clone();
        for (key, value) in other.iter() {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<Assignment> for Additions {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        let mut additions = Additions::new();
        for (key, value) in iter {
            additions.insert(key, value);
        }
        additions
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Pin {
    /// Physical (FPGA) pin for board pins, signal name for wing pins.
    pub name: Option<String>,
    /// Overrides the bus alias in emitted net names.
    pub alias: Option<String>,
    pub additions: Additions,
    /// Wing bus this pin was copied from when it got stacked onto a board slot.
    /// `None` means the pin belongs to the bus holding the slot.
    pub origin: Option<BusRef>,
    /// The pin previously occupying the slot this pin was stacked onto.
    pub below: Option<Box<Pin>>,
}

impl Pin {
    pub fn named<S>(name: S) -> Self where S: Into<String> {
        Self { name: Some(name.into()), ..Default::default() }
    }

    /// Bottom of the stacking chain, i.e. the pin that is physically wired.
    pub fn board_pin(&self) -> &Pin {
        let mut pin = self;
        while let Some(below) = &pin.below {
            pin = below;
        }
        pin
    }

    /// Copy of this pin stacked on top of `below`.
    pub fn stacked_onto(&self, origin: BusRef, below: Pin) -> Pin {
        Pin {
            name: self.name.clone(),
            alias: self.alias.clone(),
            additions: self.additions.clone(),
            origin: Some(self.origin.unwrap_or(origin)),
            below: Some(Box::new(below)),
        }
    }

    pub fn stack_depth(&self) -> usize {
        let mut depth = 0;
        let mut pin = self;
        while let Some(below) = &pin.below {
            depth += 1;
            pin = below;
        }
        depth
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Bus {
    pub name: String,
    pub alias: Option<String>,
    pub pins: Vec<Pin>,
    pub additions: Additions,
}

impl Bus {
    pub fn new<S>(name: S) -> Self where S: Into<String> {
        Self { name: name.into(), alias: None, pins: Vec::new(), additions: Additions::new() }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Name used for nets: the alias when set, the bus name otherwise.
    pub fn output_name(&self) -> &str {
        match &self.alias {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.name,
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Board {
    /// First name is canonical, the rest are aliases.
    pub names: Vec<String>,
    pub parent_name: Option<String>,
    pub buses: Vec<Bus>,
    pub is_wing: bool,
    pub header: Option<String>,
    pub configs: Vec<Assignment>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name<S>(&mut self, name: S) where S: Into<String> {
        let name = name.into();
        if !name.is_empty() {
            self.names.push(name);
        }
    }

    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn aliases(&self) -> &[String] {
        if self.names.is_empty() { &[] } else { &self.names[1 ..] }
    }

    /// Own (not inherited) bus with the given case-insensitive name.
    pub fn own_bus(&self, name: &str) -> Option<usize> {
        self.buses.iter().rposition(|bus| bus.has_name(name))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.names.join("\",\""))?;
        if let Some(parent) = &self.parent_name {
            write!(f, " : \"{}\"", parent)?;
        }
        writeln!(f, " {{")?;
        for bus in &self.buses {
            let pins: Vec<_> = bus.pins.iter()
                .map(|pin| pin.name.clone().unwrap_or_default())
                .collect();
            writeln!(f, "  \"{}\":{}", bus.name, pins.join(","))?;
        }
        write!(f, "}}")
    }
}
