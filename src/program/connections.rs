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

use super::effect::Effect;
use super::macros::Macro;
use super::modulation::{read_modulations, Modulation};
use super::script_processor::ScriptProcessor;

/// Anything that owns modulations.
pub trait ConnectionsParent {
    /// Gets the owning element.
    fn node(&self) -> NodeId;
    /// Gets a name for log messages.
    fn label(&self) -> String;
    /// Gets the owned modulations.
    fn modulations(&self) -> &[Modulation];
}

impl ConnectionsParent for Macro {
    fn node(&self) -> NodeId {
        Macro::node(self)
    }

    fn label(&self) -> String {
        format!("macro '{}'", self.display_name())
    }

    fn modulations(&self) -> &[Modulation] {
        Macro::modulations(self)
    }
}

impl ConnectionsParent for ScriptProcessor {
    fn node(&self) -> NodeId {
        ScriptProcessor::node(self)
    }

    fn label(&self) -> String {
        format!("script processor '{}'", self.name())
    }

    fn modulations(&self) -> &[Modulation] {
        ScriptProcessor::modulations(self)
    }
}

impl ConnectionsParent for Effect {
    fn node(&self) -> NodeId {
        Effect::node(self)
    }

    fn label(&self) -> String {
        format!("{} '{}'", self.effect_type(), self.name())
    }

    fn modulations(&self) -> &[Modulation] {
        Effect::modulations(self)
    }
}

/// A synthesis layer.
#[derive(Clone, Debug)]
pub struct Layer {
    node: NodeId,
    name: String,
    display_name: String,
    modulations: Vec<Modulation>,
}

impl Layer {
    pub(super) fn read(document: &Document, node: NodeId) -> Layer {
        let name = document.attribute(node, "Name").unwrap_or_default().to_string();
        Layer {
            node,
            display_name: document
                .attribute(node, "DisplayName")
                .map(str::to_string)
                .unwrap_or_else(|| name.clone()),
            name,
            modulations: read_modulations(document, node),
        }
    }

    /// Gets the layer's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the layer's display name, falling back to its name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub(super) fn modulations_mut(&mut self) -> &mut Vec<Modulation> {
        &mut self.modulations
    }
}

impl ConnectionsParent for Layer {
    fn node(&self) -> NodeId {
        self.node
    }

    fn label(&self) -> String {
        format!("layer '{}'", self.display_name)
    }

    fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }
}

/// Any other element with a Connections block: envelopes, LFOs, filters, oscillators.
#[derive(Clone, Debug)]
pub struct OtherParent {
    node: NodeId,
    element: String,
    name: String,
    modulations: Vec<Modulation>,
}

impl OtherParent {
    pub(super) fn read(document: &Document, node: NodeId) -> OtherParent {
        OtherParent {
            node,
            element: document.name(node).to_string(),
            name: document.attribute(node, "Name").unwrap_or_default().to_string(),
            modulations: read_modulations(document, node),
        }
    }

    /// Gets the element name, e.g. "DAHDSR".
    pub fn element(&self) -> &str {
        &self.element
    }
}

impl ConnectionsParent for OtherParent {
    fn node(&self) -> NodeId {
        self.node
    }

    fn label(&self) -> String {
        format!("{} '{}'", self.element, self.name)
    }

    fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }
}
