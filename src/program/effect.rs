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

/// The element that holds a chain of effects.
pub const INSERTS: &str = "Inserts";

/// An insert effect. Its element name is its type.
#[derive(Clone, Debug)]
pub struct Effect {
    node: NodeId,
    effect_type: String,
    name: String,
    bypassed: bool,
    modulations: Vec<Modulation>,
}

impl Effect {
    pub(super) fn read(document: &Document, node: NodeId) -> Effect {
        Effect {
            node,
            effect_type: document.name(node).to_string(),
            name: document.attribute(node, "Name").unwrap_or_default().to_string(),
            bypassed: document.attribute(node, "Bypass") == Some("1"),
            modulations: read_modulations(document, node),
        }
    }

    /// Gets the effect element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Gets the effect type, e.g. "DualDelay" or "SparkVerb".
    pub fn effect_type(&self) -> &str {
        &self.effect_type
    }

    /// Gets the effect's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the effect is bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Gets the modulations owned by the effect.
    pub fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }

    /// Returns true for delay and echo effects.
    pub fn is_delay(&self) -> bool {
        self.effect_type.contains("Delay") || self.effect_type.contains("Echo")
    }

    /// Returns true for reverb effects.
    pub fn is_reverb(&self) -> bool {
        self.effect_type.contains("Reverb") || self.effect_type.contains("Verb")
    }

    pub(super) fn bypass(&mut self, document: &mut Document) -> bool {
        self.bypassed = true;
        document.set_attribute(self.node, "Bypass", "1")
    }
}
