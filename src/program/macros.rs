// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use crate::xml::{Document, NodeId};

use super::modulation::{read_modulations, Modulation};

/// Element names that hold an Info page macro. ConstantModulation is the legacy name.
pub const MACRO_ELEMENTS: [&str; 2] = ["Macro", "ConstantModulation"];

/// Macros at or beyond this X coordinate are off the Info page.
pub const INFO_PAGE_RIGHT_EDGE: i32 = 695;

/// The display name of the macro that replaces the mod wheel.
pub const WHEEL: &str = "Wheel";

const ADSR: [&str; 4] = ["attack", "decay", "sustain", "release"];

/// A knob or switch on the Info page.
#[derive(Clone, Debug)]
pub struct Macro {
    node: NodeId,
    name: String,
    display_name: String,
    toggle: bool,
    bipolar: bool,
    value: f64,
    x: i32,
    y: i32,
    modulations: Vec<Modulation>,
}

impl Macro {
    pub(super) fn read(document: &Document, node: NodeId) -> Macro {
        let properties = document.child_named(node, "Properties");
        let coordinate = |key: &str| {
            properties
                .and_then(|properties| document.attribute(properties, key))
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|value| value.round() as i32)
        };

        Macro {
            node,
            name: document.attribute(node, "Name").unwrap_or_default().to_string(),
            display_name: document
                .attribute(node, "DisplayName")
                .unwrap_or_default()
                .to_string(),
            toggle: document.attribute(node, "Style") == Some("1"),
            bipolar: document.attribute(node, "Bipolar") == Some("1"),
            value: document
                .attribute(node, "Value")
                .and_then(|value| value.parse().ok())
                .unwrap_or(0.0),
            // A macro without a position cannot be shown.
            x: coordinate("x").unwrap_or(INFO_PAGE_RIGHT_EDGE),
            y: coordinate("y").unwrap_or(0),
            modulations: read_modulations(document, node),
        }
    }

    /// Gets the macro element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Gets the element name, e.g. "Macro 3", which modulation sources refer to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the ordinal in the element name.
    pub fn number(&self) -> Option<u32> {
        self.name
            .rsplit(' ')
            .next()
            .and_then(|number| number.parse().ok())
    }

    /// Gets the name shown on the Info page.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns true for a switch.
    pub fn is_toggle(&self) -> bool {
        self.toggle
    }

    /// Returns true for a knob.
    pub fn is_continuous(&self) -> bool {
        !self.toggle
    }

    /// Returns true if the macro's range is centred on zero.
    pub fn is_bipolar(&self) -> bool {
        self.bipolar
    }

    /// Gets the current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Gets the X coordinate on the Info page.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Gets the Y coordinate on the Info page.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Returns true if the macro lies within the Info page's width.
    pub fn is_on_info_page(&self) -> bool {
        self.x < INFO_PAGE_RIGHT_EDGE
    }

    /// Gets the modulations that drive the macro's own value.
    pub fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }

    /// Gets the CC number of the first non-mod-wheel MIDI CC modulation.
    pub fn cc(&self) -> Option<u8> {
        self.modulations
            .iter()
            .find(|modulation| modulation.is_non_wheel_cc())
            .and_then(Modulation::cc)
    }

    /// Returns true if the mod wheel drives the macro.
    pub fn is_modulated_by_mod_wheel(&self) -> bool {
        self.modulations.iter().any(Modulation::is_mod_wheel)
    }

    /// Returns true if this is the macro that replaces the mod wheel.
    pub fn is_wheel(&self) -> bool {
        self.display_name.eq_ignore_ascii_case(WHEEL)
    }

    /// Returns true if the macro controls reverb.
    pub fn is_reverb(&self) -> bool {
        self.display_name_contains("reverb")
    }

    /// Returns true if the macro controls delay.
    pub fn is_delay(&self) -> bool {
        self.display_name_contains("delay") || self.display_name_contains("echo")
    }

    /// Returns true if the macro controls envelope release.
    pub fn is_release(&self) -> bool {
        self.display_name_contains("release")
    }

    /// Returns true if the macro is named Attack.
    pub fn is_attack(&self) -> bool {
        self.display_name.eq_ignore_ascii_case(ADSR[0])
    }

    /// Returns true if the macro is named Attack, Decay, Sustain or Release.
    pub fn is_adsr(&self) -> bool {
        ADSR.iter()
            .any(|name| self.display_name.eq_ignore_ascii_case(name))
    }

    pub(super) fn modulations_mut(&mut self) -> &mut Vec<Modulation> {
        &mut self.modulations
    }

    pub(super) fn set_value(&mut self, document: &mut Document, value: f64) -> bool {
        self.value = value;
        document.set_attribute(self.node, "Value", super::modulation::format_number(value))
    }

    pub(super) fn set_location(&mut self, document: &mut Document, x: i32, y: i32) -> bool {
        let properties = match document.child_named(self.node, "Properties") {
            Some(properties) => properties,
            None => {
                let properties = document.create_element("Properties", &[]);
                document.append_child(self.node, properties);
                properties
            }
        };
        self.x = x;
        self.y = y;
        let x_changed = document.set_attribute(properties, "x", x.to_string());
        let y_changed = document.set_attribute(properties, "y", y.to_string());
        x_changed || y_changed
    }

    fn display_name_contains(&self, text: &str) -> bool {
        self.display_name.to_lowercase().contains(text)
    }
}
