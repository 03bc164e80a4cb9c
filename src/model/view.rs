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

use super::*;

/// Read-only view of a pin slot with the names derived from where it sits.
#[derive(Copy, Clone)]
pub struct PinView<'c> {
    catalog: &'c Catalog,
    pin_ref: PinRef,
}

impl<'c> PinView<'c> {
    pub fn new(catalog: &'c Catalog, pin_ref: PinRef) -> Self {
        Self { catalog, pin_ref }
    }

    pub fn pin_ref(&self) -> PinRef {
        self.pin_ref
    }

    pub fn pin(&self) -> &'c Pin {
        self.catalog.pin(self.pin_ref)
    }

    /// Bus holding the slot.
    pub fn slot_bus(&self) -> &'c Bus {
        self.catalog.bus(self.pin_ref.slot)
    }

    /// Bus the pin came from: the wing bus for stacked pins.
    pub fn owner(&self) -> BusRef {
        self.pin().origin.unwrap_or(self.pin_ref.slot)
    }

    pub fn is_wing(&self) -> bool {
        self.catalog.board(self.owner().board).is_wing
    }

    /// Chip pin this slot is wired to.
    pub fn physical_name(&self) -> Option<&'c str> {
        self.pin().board_pin().name.as_deref()
    }

    fn indexed(&self, base: &str) -> String {
        if self.slot_bus().pin_count() > 1 {
            format!("{}{}", base, self.pin_ref.index)
        } else {
            base.to_string()
        }
    }

    /// Header pin name, e.g. `A3` or `CLK`.
    pub fn canonical_name(&self) -> String {
        self.indexed(&self.slot_bus().name)
    }

    /// Key used to pair pins across boards. Per-pin aliases are ignored.
    pub fn constraint_name(&self) -> String {
        self.indexed(self.slot_bus().output_name())
    }

    /// Name written after `NET`. `None` marks a slot nothing is connected to.
    pub fn net_name(&self) -> Option<String> {
        let pin = self.pin();

        if self.is_wing() {
            return pin.name.clone().filter(|name| !name.is_empty());
        }

        let bus = self.slot_bus();
        let base = match &pin.alias {
            Some(alias) if !alias.is_empty() => alias.as_str(),
            _ => bus.output_name(),
        };

        if bus.pin_count() > 1 {
            Some(format!("{}({})", base, self.pin_ref.index))
        } else {
            Some(base.to_string())
        }
    }

    /// Owner bus additions overridden by the pin's own.
    pub fn additions(&self) -> Additions {
        self.catalog.bus(self.owner()).additions.merged_with(&self.pin().additions)
    }
}

impl<'c> std::fmt::Debug for PinView<'c> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f, "{} -> {}",
            self.canonical_name(),
            self.physical_name().unwrap_or("<unconnected>")
        )
    }
}
