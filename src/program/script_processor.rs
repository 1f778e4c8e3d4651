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

use super::modulation::{read_modulations, Modulation, CONNECTIONS};

/// The element name of a script processor.
pub const SCRIPT_PROCESSOR: &str = "ScriptProcessor";

const ARPEGGIATOR_AND_SEQUENCING_WORDS: [&str; 2] = ["arpeggi", "sequenc"];
const ARPEGGIATOR_AND_SEQUENCING_PREFIXES: [&str; 2] = ["arp", "seq"];

/// A script-defined control unit. When it defines the Info page, it owns the
/// MIDI CC modulations instead of the macros.
#[derive(Clone, Debug)]
pub struct ScriptProcessor {
    node: NodeId,
    name: String,
    script: String,
    program_level: bool,
    modulations: Vec<Modulation>,
}

impl ScriptProcessor {
    pub(super) fn read(document: &Document, node: NodeId, program_level: bool) -> ScriptProcessor {
        ScriptProcessor {
            node,
            name: document.attribute(node, "Name").unwrap_or_default().to_string(),
            script: document
                .attribute(node, "Script")
                .unwrap_or_default()
                .to_string(),
            program_level,
            modulations: read_modulations(document, node),
        }
    }

    /// Gets the ScriptProcessor element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the script path or source.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Returns true if the script processor belongs to the program rather than a layer or keygroup.
    pub fn is_program_level(&self) -> bool {
        self.program_level
    }

    /// Gets the modulations owned by the script processor.
    pub fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }

    /// Returns true if the script processor maps MIDI CCs, which makes it the Info page GUI.
    pub fn owns_cc_modulations(&self) -> bool {
        self.modulations.iter().any(Modulation::is_non_wheel_cc)
    }

    /// Returns true if the script arpeggiates or sequences notes.
    pub fn is_arpeggiator_or_sequencer(&self) -> bool {
        let script = self.script.to_lowercase();
        [self.name.to_lowercase(), script_file_name(&script).to_string()]
            .iter()
            .any(|text| {
                ARPEGGIATOR_AND_SEQUENCING_WORDS
                    .iter()
                    .any(|word| text.contains(word))
                    || text
                        .split(|c: char| !c.is_alphanumeric())
                        .any(|token| {
                            ARPEGGIATOR_AND_SEQUENCING_PREFIXES
                                .iter()
                                .any(|prefix| token.starts_with(prefix))
                        })
            })
    }
}

/// A copy of a template program's script processor whose modulations are the
/// canonical CC map for a category.
#[derive(Clone, Debug)]
pub struct ScriptProcessorTemplate {
    name: String,
    document: Document,
    node: NodeId,
}

impl ScriptProcessorTemplate {
    pub(super) fn new(name: &str, document: Document, node: NodeId) -> ScriptProcessorTemplate {
        ScriptProcessorTemplate {
            name: name.to_string(),
            document,
            node,
        }
    }

    /// Gets the template script processor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the template's modulations.
    pub fn modulations(&self) -> Vec<Modulation> {
        read_modulations(&self.document, self.node)
    }

    pub(super) fn document(&self) -> &Document {
        &self.document
    }

    pub(super) fn connections(&self) -> Option<NodeId> {
        self.document.child_named(self.node, CONNECTIONS)
    }
}

fn script_file_name(script: &str) -> &str {
    script.rsplit(['/', '\\']).next().unwrap_or(script)
}
