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
use std::fmt;

use crate::config::MOD_WHEEL_CC;
use crate::xml::{Document, NodeId};

/// The element holding a connections parent's modulations.
pub const CONNECTIONS: &str = "Connections";
/// A single modulation.
pub const SIGNAL_CONNECTION: &str = "SignalConnection";

const MIDI_CC_PREFIX: &str = "@MIDI CC ";
const MACRO_PREFIX: &str = "$Program/";

/// What drives a modulation.
#[derive(Clone, Debug, PartialEq)]
pub enum ModulationSource {
    /// A MIDI CC number. CC 1 is the mod wheel.
    MidiCc(u8),
    /// A program-level macro, identified by its element name (e.g. "Macro 3").
    Macro(String),
    /// Anything else (LFOs, envelopes, velocity, ...).
    Other(String),
}

impl ModulationSource {
    /// Parses a Source attribute.
    pub fn parse(source: &str) -> ModulationSource {
        if let Some(cc) = source
            .strip_prefix(MIDI_CC_PREFIX)
            .and_then(|cc| cc.trim().parse::<u8>().ok())
        {
            return ModulationSource::MidiCc(cc);
        }
        match source.strip_prefix(MACRO_PREFIX) {
            Some(name) => ModulationSource::Macro(name.to_string()),
            None => ModulationSource::Other(source.to_string()),
        }
    }
}

impl fmt::Display for ModulationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulationSource::MidiCc(cc) => write!(f, "{}{}", MIDI_CC_PREFIX, cc),
            ModulationSource::Macro(name) => write!(f, "{}{}", MACRO_PREFIX, name),
            ModulationSource::Other(source) => f.write_str(source),
        }
    }
}

/// A routing edge from a source to a parameter of the connections parent that owns it.
#[derive(Clone, Debug)]
pub struct Modulation {
    node: NodeId,
    source: ModulationSource,
    destination: String,
    ratio: f64,
}

impl Modulation {
    pub(super) fn read(document: &Document, node: NodeId) -> Modulation {
        Modulation {
            node,
            source: ModulationSource::parse(document.attribute(node, "Source").unwrap_or_default()),
            destination: document
                .attribute(node, "Destination")
                .unwrap_or_default()
                .to_string(),
            ratio: document
                .attribute(node, "Ratio")
                .and_then(|ratio| ratio.parse().ok())
                .unwrap_or(1.0),
        }
    }

    /// Gets the SignalConnection element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Gets the source.
    pub fn source(&self) -> &ModulationSource {
        &self.source
    }

    /// Gets the destination parameter.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Gets the scaling ratio. 1 is 100%.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Gets the MIDI CC number if the source is a MIDI CC.
    pub fn cc(&self) -> Option<u8> {
        match self.source {
            ModulationSource::MidiCc(cc) => Some(cc),
            _ => None,
        }
    }

    /// Returns true if the mod wheel drives this modulation.
    pub fn is_mod_wheel(&self) -> bool {
        self.cc() == Some(MOD_WHEEL_CC)
    }

    /// Returns true if a MIDI CC other than the mod wheel drives this modulation.
    pub fn is_non_wheel_cc(&self) -> bool {
        self.cc().is_some_and(|cc| cc != MOD_WHEEL_CC)
    }

    /// Returns true if the given macro drives this modulation.
    pub fn is_from_macro(&self, macro_name: &str) -> bool {
        matches!(&self.source, ModulationSource::Macro(name) if name == macro_name)
    }

    pub(super) fn set_source(&mut self, document: &mut Document, source: ModulationSource) -> bool {
        let changed = document.set_attribute(self.node, "Source", source.to_string());
        self.source = source;
        changed
    }

    pub(super) fn set_ratio(&mut self, document: &mut Document, ratio: f64) -> bool {
        let changed = document.set_attribute(self.node, "Ratio", format_number(ratio));
        self.ratio = ratio;
        changed
    }
}

/// Reads the modulations in the owner's Connections block.
pub(super) fn read_modulations(document: &Document, owner: NodeId) -> Vec<Modulation> {
    match document.child_named(owner, CONNECTIONS) {
        Some(connections) => document
            .children_named(connections, SIGNAL_CONNECTION)
            .map(|node| Modulation::read(document, node))
            .collect(),
        None => Vec::new(),
    }
}

/// Adds a modulation to the owner's Connections block, creating the block if needed.
pub(super) fn add_modulation(
    document: &mut Document,
    owner: NodeId,
    source: ModulationSource,
    destination: &str,
    ratio: f64,
) -> Modulation {
    let connections = match document.child_named(owner, CONNECTIONS) {
        Some(connections) => connections,
        None => {
            let connections = document.create_element(CONNECTIONS, &[]);
            document.append_child(owner, connections);
            connections
        }
    };
    let node = document.create_element(
        SIGNAL_CONNECTION,
        &[
            ("Ratio", format_number(ratio)),
            ("Source", source.to_string()),
            ("Destination", destination.to_string()),
        ],
    );
    document.append_child(connections, node);
    Modulation {
        node,
        source,
        destination: destination.to_string(),
        ratio,
    }
}

/// Formats a number the way the program files do: whole numbers without a fraction.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
