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
//! The program model: typed views projected over the live XML document of a
//! program file. Every edit is written straight into the document, so
//! anything the model does not understand is saved exactly as it was read.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::xml::{Document, NodeId};

mod connections;
mod effect;
mod macros;
mod modulation;
mod script_processor;
mod sound_bank;

pub use connections::{ConnectionsParent, Layer, OtherParent};
pub use effect::Effect;
pub use macros::{Macro, INFO_PAGE_RIGHT_EDGE, WHEEL};
pub use modulation::{format_number, Modulation, ModulationSource};
pub use script_processor::{ScriptProcessor, ScriptProcessorTemplate};

use effect::INSERTS;
use macros::MACRO_ELEMENTS;
use modulation::{add_modulation, CONNECTIONS, SIGNAL_CONNECTION};
use script_processor::SCRIPT_PROCESSOR;

/// The file extension of program files.
pub const PROGRAM_EXTENSION: &str = "uvip";

const PROGRAM: &str = "Program";
const PROPERTIES: &str = "Properties";
const CONTROL_SIGNAL_SOURCES: &str = "ControlSignalSources";
const EVENT_PROCESSORS: &str = "EventProcessors";
const LAYER: &str = "Layer";

/// A macro to add to a program.
#[derive(Clone, Debug)]
pub struct NewMacro {
    pub display_name: String,
    pub value: f64,
    pub toggle: bool,
    pub cc: u8,
}

/// One program file.
pub struct Program {
    path: PathBuf,
    document: Document,
    program_node: NodeId,
    macros_node: NodeId,
    macros: Vec<Macro>,
    script_processors: Vec<ScriptProcessor>,
    effects: Vec<Effect>,
    layers: Vec<Layer>,
    other_parents: Vec<OtherParent>,
    sound_bank: String,
    sound_bank_folder: String,
    category: String,
    updated: bool,
}

impl Program {
    /// Reads a program file. The file is expected to live at
    /// `<sound bank>/<category>/<program>.uvip`.
    pub fn read(path: &Path) -> Result<Program> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let document = Document::parse(&text).map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        Program::from_document(path, document)
    }

    fn from_document(path: &Path, document: Document) -> Result<Program> {
        let root = document.root().ok_or_else(|| {
            Error::application(format!("{} contains no XML elements.", path.display()))
        })?;
        let program_node = if document.name(root) == PROGRAM {
            root
        } else {
            document
                .descendants_named(root, PROGRAM)
                .first()
                .copied()
                .ok_or_else(|| {
                    Error::application(format!(
                        "{} has no {} element, so it is not a program file.",
                        path.display(),
                        PROGRAM
                    ))
                })?
        };
        let macros_node = document
            .child_named(program_node, CONTROL_SIGNAL_SOURCES)
            .ok_or_else(|| {
                Error::application(format!(
                    "{} has no {} block. Restore the original program and try again.",
                    path.display(),
                    CONTROL_SIGNAL_SOURCES
                ))
            })?;

        let category_folder = path.parent();
        let category = folder_name(category_folder);
        let sound_bank_folder = folder_name(category_folder.and_then(Path::parent));
        let sound_bank = sound_bank::identify(&document, program_node, &sound_bank_folder);

        let mut program = Program {
            path: path.to_path_buf(),
            document,
            program_node,
            macros_node,
            macros: Vec::new(),
            script_processors: Vec::new(),
            effects: Vec::new(),
            layers: Vec::new(),
            other_parents: Vec::new(),
            sound_bank,
            sound_bank_folder,
            category,
            updated: false,
        };
        program.macros = program
            .macro_nodes()
            .into_iter()
            .map(|node| Macro::read(&program.document, node))
            .collect();
        program.read_connections_parents();
        debug!(
            path = ?program.path,
            sound_bank = %program.sound_bank,
            macros = program.macros.len(),
            "Read program"
        );
        Ok(program)
    }

    /// Writes the document back to the file it was read from.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.document.to_xml_string()).map_err(|e| Error::io(&self.path, e))
    }

    /// Writes the in-memory macro order into the document, saves it and rebuilds
    /// the model from the saved file. Relocating macros without a reload leaves
    /// the model out of step with the file, so every structural reorder ends here.
    pub fn commit_and_reload(&mut self) -> Result<()> {
        let order: Vec<NodeId> = self.macros.iter().map(Macro::node).collect();
        self.document.reorder_children(self.macros_node, &order);
        self.save()?;
        let reloaded = Program::read(&self.path)?;
        *self = Program {
            updated: true,
            ..reloaded
        };
        Ok(())
    }

    /// Gets the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the program name, which is the file stem.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Gets the sound bank identified from the program's contents.
    pub fn sound_bank(&self) -> &str {
        &self.sound_bank
    }

    /// Gets the name of the sound bank folder the program lives in.
    pub fn sound_bank_folder(&self) -> &str {
        &self.sound_bank_folder
    }

    /// Gets the name of the category folder the program lives in.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns true if any task has changed the program since it was read.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Serializes the current document.
    pub fn to_xml_string(&self) -> String {
        self.document.to_xml_string()
    }

    /// Gets the macros in their current in-memory order.
    pub fn macros(&self) -> &[Macro] {
        &self.macros
    }

    /// Gets every script processor, at any nesting level, in document order.
    pub fn script_processors(&self) -> &[ScriptProcessor] {
        &self.script_processors
    }

    /// Gets the script processors that belong to the program itself.
    pub fn program_script_processors(&self) -> impl Iterator<Item = (usize, &ScriptProcessor)> {
        self.script_processors
            .iter()
            .enumerate()
            .filter(|(_, script_processor)| script_processor.is_program_level())
    }

    /// Gets the script processor that defines the Info page, if any: the last
    /// program-level script processor that maps MIDI CCs.
    pub fn gui_script_processor(&self) -> Option<usize> {
        self.program_script_processors()
            .filter(|(_, script_processor)| script_processor.owns_cc_modulations())
            .map(|(index, _)| index)
            .last()
    }

    /// Gets the insert effects.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Gets the layers.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Gets the elements named DAHDSR along with their modulations.
    pub fn dahdsrs(&self) -> impl Iterator<Item = &OtherParent> {
        self.other_parents
            .iter()
            .filter(|parent| parent.element() == "DAHDSR")
    }

    /// Gets everything that owns modulations.
    pub fn connections_parents(&self) -> Vec<&dyn ConnectionsParent> {
        let mut parents: Vec<&dyn ConnectionsParent> = Vec::new();
        parents.extend(self.macros.iter().map(|m| m as &dyn ConnectionsParent));
        parents.extend(
            self.script_processors
                .iter()
                .map(|s| s as &dyn ConnectionsParent),
        );
        parents.extend(self.effects.iter().map(|e| e as &dyn ConnectionsParent));
        parents.extend(self.layers.iter().map(|l| l as &dyn ConnectionsParent));
        parents.extend(
            self.other_parents
                .iter()
                .map(|o| o as &dyn ConnectionsParent),
        );
        parents
    }

    /// Gets the modulations the macro drives, with a label for their owners.
    pub fn macro_targets(&self, index: usize) -> Vec<(String, &Modulation)> {
        let name = self.macros[index].name();
        self.connections_parents()
            .into_iter()
            .flat_map(|parent| {
                let label = parent.label();
                parent
                    .modulations()
                    .iter()
                    .filter(move |modulation| modulation.is_from_macro(name))
                    .map(move |modulation| (label.clone(), modulation))
            })
            .collect()
    }

    /// Returns true if the mod wheel drives the macro, directly or through the Wheel macro.
    pub fn is_wheel_modulated(&self, index: usize) -> bool {
        let target = &self.macros[index];
        if target.is_modulated_by_mod_wheel() {
            return true;
        }
        self.macros.iter().filter(|m| m.is_wheel()).any(|wheel| {
            target
                .modulations()
                .iter()
                .any(|modulation| modulation.is_from_macro(wheel.name()))
        })
    }

    /// Gets the indices of the macros a user can see: those on the Info page
    /// that do not share their position with another macro.
    pub fn visible_macro_indices(&self) -> Vec<usize> {
        (0..self.macros.len())
            .filter(|&index| {
                let this = &self.macros[index];
                this.is_on_info_page()
                    && !self.macros.iter().enumerate().any(|(other_index, other)| {
                        other_index != index
                            && other.is_on_info_page()
                            && other.x() == this.x()
                            && other.y() == this.y()
                    })
            })
            .collect()
    }

    /// Gets the program description.
    pub fn description(&self) -> &str {
        self.properties()
            .and_then(|properties| self.document.attribute(properties, "Description"))
            .unwrap_or_default()
    }

    /// Returns true if the program does not set its own Info page background.
    pub fn uses_default_background(&self) -> bool {
        self.properties()
            .and_then(|properties| self.document.attribute(properties, "BackgroundImagePath"))
            .map_or(true, |path| path.trim().is_empty())
    }

    /// Sets the program description.
    pub fn set_description(&mut self, description: &str) -> bool {
        let properties = match self.properties() {
            Some(properties) => properties,
            None => {
                let properties = self.document.create_element(PROPERTIES, &[]);
                self.document.append_child(self.program_node, properties);
                properties
            }
        };
        let changed = self
            .document
            .set_attribute(properties, "Description", description);
        self.track(changed)
    }

    /// Sets a macro's value.
    pub fn set_macro_value(&mut self, index: usize, value: f64) -> bool {
        let changed = self.macros[index].set_value(&mut self.document, value);
        self.track(changed)
    }

    /// Moves a macro on the Info page.
    pub fn set_macro_location(&mut self, index: usize, x: i32, y: i32) -> bool {
        let changed = self.macros[index].set_location(&mut self.document, x, y);
        self.track(changed)
    }

    /// Maps a MIDI CC to the macro's value. An existing CC modulation is kept
    /// with only its CC number replaced; a toggle whose ratio is -1 is a known
    /// corruption and gets ratio 1. Without one, a new modulation is added.
    pub fn set_macro_cc(&mut self, index: usize, cc: u8) -> bool {
        let document = &mut self.document;
        let target = &mut self.macros[index];
        let toggle = target.is_toggle();
        let owner = target.node();
        let positions: Vec<usize> = target
            .modulations()
            .iter()
            .enumerate()
            .filter(|(_, modulation)| modulation.is_non_wheel_cc())
            .map(|(position, _)| position)
            .collect();

        let mut changed = false;
        match positions.split_first() {
            Some((&first, extras)) => {
                let modulations = target.modulations_mut();
                let modulation = &mut modulations[first];
                changed |= modulation.set_source(document, ModulationSource::MidiCc(cc));
                if toggle && modulation.ratio() == -1.0 {
                    changed |= modulation.set_ratio(document, 1.0);
                }
                for &extra in extras.iter().rev() {
                    let removed = modulations.remove(extra);
                    document.remove(removed.node());
                    changed = true;
                }
            }
            None => {
                let modulation = add_modulation(
                    document,
                    owner,
                    ModulationSource::MidiCc(cc),
                    "Value",
                    1.0,
                );
                target.modulations_mut().push(modulation);
                changed = true;
            }
        }
        self.track(changed)
    }

    /// Puts the macros into a new in-memory order, given as indices into the current
    /// order. Call [`Program::commit_and_reload`] before making further edits.
    pub fn reorder_macros(&mut self, order: &[usize]) {
        let reordered: Vec<Macro> = order.iter().map(|&index| self.macros[index].clone()).collect();
        if reordered.len() == self.macros.len() {
            self.macros = reordered;
        }
    }

    /// Adds a macro at the given position in the in-memory order and returns its index.
    pub fn insert_macro(&mut self, index: usize, new_macro: &NewMacro) -> usize {
        let element = self
            .macros
            .first()
            .map(|first| self.document.name(first.node()).to_string())
            .unwrap_or_else(|| MACRO_ELEMENTS[1].to_string());
        let number = self
            .macros
            .iter()
            .filter_map(Macro::number)
            .max()
            .unwrap_or(0)
            + 1;

        let node = self.document.create_element(
            &element,
            &[
                ("Name", format!("Macro {}", number)),
                ("Bipolar", "0".to_string()),
                ("DisplayName", new_macro.display_name.clone()),
                ("Style", if new_macro.toggle { "1" } else { "0" }.to_string()),
                ("Value", format_number(new_macro.value)),
            ],
        );
        self.document.append_child(self.macros_node, node);
        let properties = self.document.create_element(
            PROPERTIES,
            &[("x", "0".to_string()), ("y", "0".to_string())],
        );
        self.document.append_child(node, properties);
        add_modulation(
            &mut self.document,
            node,
            ModulationSource::MidiCc(new_macro.cc),
            "Value",
            1.0,
        );

        let index = index.min(self.macros.len());
        self.macros
            .insert(index, Macro::read(&self.document, node));
        self.updated = true;
        index
    }

    /// Removes a macro along with every modulation it drives.
    pub fn remove_macro(&mut self, index: usize) {
        let removed = self.macros.remove(index);
        let sourced: Vec<NodeId> = self
            .document
            .descendants_named(self.program_node, SIGNAL_CONNECTION)
            .into_iter()
            .filter(|&node| {
                self.document
                    .attribute(node, "Source")
                    .map(ModulationSource::parse)
                    == Some(ModulationSource::Macro(removed.name().to_string()))
            })
            .collect();
        for node in sourced {
            self.document.remove(node);
        }
        self.document.remove(removed.node());
        self.refresh_connections();
        self.updated = true;
    }

    /// Bypasses an effect.
    pub fn bypass_effect(&mut self, index: usize) -> bool {
        let changed = self.effects[index].bypass(&mut self.document);
        self.track(changed)
    }

    /// Points every mod wheel modulation at a new source. Returns the labels of
    /// the owners whose modulations changed.
    pub fn replace_mod_wheel_modulations(&mut self, source: &ModulationSource) -> Vec<String> {
        let mut changed_owners = Vec::new();
        let owners: Vec<(String, Vec<NodeId>)> = self
            .connections_parents()
            .into_iter()
            .map(|parent| {
                (
                    parent.label(),
                    parent
                        .modulations()
                        .iter()
                        .filter(|modulation| modulation.is_mod_wheel())
                        .map(Modulation::node)
                        .collect::<Vec<NodeId>>(),
                )
            })
            .filter(|(_, nodes)| !nodes.is_empty())
            .collect();
        for (label, nodes) in owners {
            for node in nodes {
                self.document
                    .set_attribute(node, "Source", source.to_string());
            }
            changed_owners.push(label);
        }
        if !changed_owners.is_empty() {
            self.refresh_connections();
            self.updated = true;
        }
        changed_owners
    }

    /// Removes a script processor and everything inside it.
    pub fn remove_script_processor(&mut self, index: usize) {
        let node = self.script_processors[index].node();
        self.document.remove(node);
        self.refresh_connections();
        self.updated = true;
    }

    /// Replaces a script processor's modulations with copies of the template's.
    /// Nothing changes if the modulations already match.
    pub fn copy_cc_map(&mut self, index: usize, template: &ScriptProcessorTemplate) -> bool {
        let owner = self.script_processors[index].node();
        let Some(source_connections) = template.connections() else {
            return false;
        };
        let source = template.document();
        let wanted: Vec<NodeId> = source
            .children_named(source_connections, SIGNAL_CONNECTION)
            .collect();

        let connections = self.document.child_named(owner, CONNECTIONS);
        let existing: Vec<NodeId> = connections
            .map(|connections| {
                self.document
                    .children_named(connections, SIGNAL_CONNECTION)
                    .collect()
            })
            .unwrap_or_default();
        let identical = existing.len() == wanted.len()
            && existing
                .iter()
                .zip(wanted.iter())
                .all(|(&have, &want)| self.document.attributes(have) == source.attributes(want));
        if identical {
            return false;
        }

        for node in existing {
            self.document.remove(node);
        }
        let connections = match connections {
            Some(connections) => connections,
            None => {
                let connections = self.document.create_element(CONNECTIONS, &[]);
                self.document.append_child(owner, connections);
                connections
            }
        };
        for node in wanted {
            let copy = self.document.import(source, node);
            self.document.append_child(connections, copy);
        }
        self.refresh_connections();
        self.updated = true;
        true
    }

    /// Adds a program-level script processor with the given attributes.
    pub fn add_script_processor(&mut self, attributes: &[(&str, String)]) {
        let event_processors = match self
            .document
            .child_named(self.program_node, EVENT_PROCESSORS)
        {
            Some(event_processors) => event_processors,
            None => {
                let event_processors = self.document.create_element(EVENT_PROCESSORS, &[]);
                self.document
                    .append_child(self.program_node, event_processors);
                event_processors
            }
        };
        let node = self.document.create_element(SCRIPT_PROCESSOR, attributes);
        self.document.append_child(event_processors, node);
        self.refresh_connections();
        self.updated = true;
    }

    /// Makes a macro modulate a parameter of a layer, unless it already does.
    pub fn connect_macro_to_layer(
        &mut self,
        macro_index: usize,
        layer_index: usize,
        destination: &str,
    ) -> bool {
        let source = ModulationSource::Macro(self.macros[macro_index].name().to_string());
        let layer = &mut self.layers[layer_index];
        if layer
            .modulations()
            .iter()
            .any(|modulation| *modulation.source() == source && modulation.destination() == destination)
        {
            return false;
        }
        let modulation = add_modulation(
            &mut self.document,
            layer.node(),
            source,
            destination,
            1.0,
        );
        layer.modulations_mut().push(modulation);
        self.updated = true;
        true
    }

    /// Makes a copy of a program-level script processor to use as a CC map template.
    pub fn script_processor_template(&self, index: usize) -> ScriptProcessorTemplate {
        let script_processor = &self.script_processors[index];
        ScriptProcessorTemplate::new(
            script_processor.name(),
            self.document.clone(),
            script_processor.node(),
        )
    }

    fn track(&mut self, changed: bool) -> bool {
        if changed {
            self.updated = true;
        }
        changed
    }

    fn properties(&self) -> Option<NodeId> {
        self.document.child_named(self.program_node, PROPERTIES)
    }

    fn macro_nodes(&self) -> Vec<NodeId> {
        self.document
            .child_elements(self.macros_node)
            .filter(|&node| MACRO_ELEMENTS.contains(&self.document.name(node)))
            .collect()
    }

    /// Re-reads every modulation from the document, keeping the in-memory macro order.
    fn refresh_connections(&mut self) {
        for existing in self.macros.iter_mut() {
            *existing = Macro::read(&self.document, existing.node());
        }
        self.read_connections_parents();
    }

    fn read_connections_parents(&mut self) {
        let document = &self.document;
        let program_node = self.program_node;
        let macro_nodes: Vec<NodeId> = self.macros.iter().map(Macro::node).collect();

        self.script_processors = document
            .descendants_named(program_node, SCRIPT_PROCESSOR)
            .into_iter()
            .map(|node| {
                let program_level = document
                    .parent(node)
                    .filter(|&parent| document.name(parent) == EVENT_PROCESSORS)
                    .and_then(|parent| document.parent(parent))
                    == Some(program_node);
                ScriptProcessor::read(document, node, program_level)
            })
            .collect();
        self.effects = document
            .descendants_named(program_node, INSERTS)
            .into_iter()
            .flat_map(|inserts| document.child_elements(inserts).collect::<Vec<NodeId>>())
            .map(|node| Effect::read(document, node))
            .collect();
        self.layers = document
            .descendants_named(program_node, LAYER)
            .into_iter()
            .map(|node| Layer::read(document, node))
            .collect();

        let known: Vec<NodeId> = macro_nodes
            .into_iter()
            .chain(self.script_processors.iter().map(ScriptProcessor::node))
            .chain(self.effects.iter().map(Effect::node))
            .chain(self.layers.iter().map(|layer| layer.node()))
            .collect();
        self.other_parents = document
            .descendants(program_node)
            .into_iter()
            .filter(|&node| {
                !known.contains(&node) && document.child_named(node, CONNECTIONS).is_some()
            })
            .map(|node| OtherParent::read(document, node))
            .collect();
    }
}

fn folder_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
