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
//! Builders for the program files and settings tests run against.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CcRange, Folders, MidiForMacros, Settings};

/// A macro to put in a test program.
#[derive(Clone)]
pub struct MacroSpec {
    display_name: String,
    toggle: bool,
    value: f64,
    location: Option<(i32, i32)>,
    connections: Vec<(String, String, f64)>,
}

impl MacroSpec {
    /// A continuous macro at the given position.
    pub fn continuous(display_name: &str, x: i32, y: i32) -> MacroSpec {
        MacroSpec {
            display_name: display_name.to_string(),
            toggle: false,
            value: 0.5,
            location: Some((x, y)),
            connections: Vec::new(),
        }
    }

    /// A toggle macro at the given position.
    pub fn toggle(display_name: &str, x: i32, y: i32) -> MacroSpec {
        MacroSpec {
            toggle: true,
            value: 1.0,
            ..MacroSpec::continuous(display_name, x, y)
        }
    }

    /// A macro with no Properties element.
    pub fn unplaced(display_name: &str) -> MacroSpec {
        MacroSpec {
            location: None,
            ..MacroSpec::continuous(display_name, 0, 0)
        }
    }

    pub fn value(mut self, value: f64) -> MacroSpec {
        self.value = value;
        self
    }

    /// Maps a MIDI CC to the macro's value.
    pub fn cc(self, cc: u8) -> MacroSpec {
        self.cc_with_ratio(cc, 1.0)
    }

    pub fn cc_with_ratio(mut self, cc: u8, ratio: f64) -> MacroSpec {
        self.connections
            .push((format!("@MIDI CC {}", cc), "Value".to_string(), ratio));
        self
    }

    /// Lets another macro modulate this one's value.
    pub fn from_macro(mut self, name: &str) -> MacroSpec {
        self.connections
            .push((format!("$Program/{}", name), "Value".to_string(), 1.0));
        self
    }
}

/// A test program.
#[derive(Clone, Default)]
pub struct ProgramSpec {
    macros: Vec<MacroSpec>,
    properties: Vec<(String, String)>,
    event_processors: Vec<String>,
    inserts: Vec<String>,
    layers: Vec<String>,
    dahdsrs: Vec<String>,
}

impl ProgramSpec {
    /// A program made by the given sound bank.
    pub fn new(sound_bank: &str, macros: Vec<MacroSpec>) -> ProgramSpec {
        ProgramSpec {
            macros,
            properties: vec![
                ("Description".to_string(), String::new()),
                (
                    "OriginalProgramPath".to_string(),
                    format!("$Library/{}.ufs/Programs/Test.uvip", sound_bank),
                ),
            ],
            ..ProgramSpec::default()
        }
    }

    pub fn property(mut self, key: &str, value: &str) -> ProgramSpec {
        self.properties.retain(|(existing, _)| existing != key);
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a program-level script processor mapping the given CCs to its parameters.
    pub fn script_processor(mut self, name: &str, script: &str, ccs: &[(u8, &str)]) -> ProgramSpec {
        let mut xml = format!(
            "            <ScriptProcessor Name=\"{}\" Bypass=\"0\" Script=\"{}\">\n",
            name, script
        );
        xml.push_str(&connections("                ", ccs.iter().map(|(cc, destination)| {
            (format!("@MIDI CC {}", cc), destination.to_string())
        })));
        xml.push_str("            </ScriptProcessor>\n");
        self.event_processors.push(xml);
        self
    }

    /// Adds a program-level script processor whose parameters the given sources drive.
    pub fn driven_script_processor(mut self, name: &str, script: &str, sources: &[(&str, &str)]) -> ProgramSpec {
        let mut xml = format!(
            "            <ScriptProcessor Name=\"{}\" Bypass=\"0\" Script=\"{}\">\n",
            name, script
        );
        xml.push_str(&connections(
            "                ",
            sources
                .iter()
                .map(|(source, destination)| (source.to_string(), destination.to_string())),
        ));
        xml.push_str("            </ScriptProcessor>\n");
        self.event_processors.push(xml);
        self
    }

    /// Adds an insert effect driven by the given sources.
    pub fn effect(mut self, effect_type: &str, name: &str, sources: &[(&str, &str)]) -> ProgramSpec {
        let mut xml = format!(
            "            <{} Name=\"{}\" Bypass=\"0\">\n",
            effect_type, name
        );
        xml.push_str(&connections(
            "                ",
            sources
                .iter()
                .map(|(source, destination)| (source.to_string(), destination.to_string())),
        ));
        xml.push_str(&format!("            </{}>\n", effect_type));
        self.inserts.push(xml);
        self
    }

    /// Adds a layer with an optional script processor of its own.
    pub fn layer(mut self, display_name: &str, script_processor: Option<&str>) -> ProgramSpec {
        let number = self.layers.len() + 1;
        let mut xml = format!(
            "            <Layer Name=\"Layer {}\" DisplayName=\"{}\">\n",
            number, display_name
        );
        if let Some(script_processor) = script_processor {
            xml.push_str("                <EventProcessors>\n");
            xml.push_str(&format!(
                "                    <ScriptProcessor Name=\"{}\" Bypass=\"0\" Script=\"{}.lua\"/>\n",
                script_processor, script_processor
            ));
            xml.push_str("                </EventProcessors>\n");
        }
        xml.push_str("            </Layer>\n");
        self.layers.push(xml);
        self
    }

    /// Adds an envelope modulated by the given macros.
    pub fn dahdsr(mut self, name: &str, sources: &[(&str, &str)]) -> ProgramSpec {
        let mut xml = format!("            <DAHDSR Name=\"{}\">\n", name);
        xml.push_str(&connections(
            "                ",
            sources
                .iter()
                .map(|(source, destination)| (source.to_string(), destination.to_string())),
        ));
        xml.push_str("            </DAHDSR>\n");
        self.dahdsrs.push(xml);
        self
    }

    /// Renders the program the way the instrument saves it.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<UVI4>\n");
        xml.push_str("    <Program Name=\"Test\" Bypass=\"0\">\n");
        xml.push_str("        <Properties");
        for (key, value) in self.properties.iter() {
            xml.push_str(&format!(" {}=\"{}\"", key, value));
        }
        xml.push_str("/>\n");
        xml.push_str("        <ControlSignalSources>\n");
        for (index, spec) in self.macros.iter().enumerate() {
            xml.push_str(&format!(
                "            <ConstantModulation Name=\"Macro {}\" Bipolar=\"0\" DisplayName=\"{}\" Style=\"{}\" Value=\"{}\">\n",
                index + 1,
                spec.display_name,
                if spec.toggle { 1 } else { 0 },
                spec.value
            ));
            if let Some((x, y)) = spec.location {
                xml.push_str(&format!(
                    "                <Properties x=\"{}\" y=\"{}\"/>\n",
                    x, y
                ));
            }
            if !spec.connections.is_empty() {
                xml.push_str("                <Connections>\n");
                for (source, destination, ratio) in spec.connections.iter() {
                    xml.push_str(&format!(
                        "                    <SignalConnection Ratio=\"{}\" Source=\"{}\" Destination=\"{}\"/>\n",
                        ratio, source, destination
                    ));
                }
                xml.push_str("                </Connections>\n");
            }
            xml.push_str("            </ConstantModulation>\n");
        }
        xml.push_str("        </ControlSignalSources>\n");
        for (element, parts) in [
            ("EventProcessors", &self.event_processors),
            ("Inserts", &self.inserts),
            ("Layers", &self.layers),
            ("Modulators", &self.dahdsrs),
        ] {
            if parts.is_empty() {
                continue;
            }
            xml.push_str(&format!("        <{}>\n", element));
            for part in parts.iter() {
                xml.push_str(part);
            }
            xml.push_str(&format!("        </{}>\n", element));
        }
        xml.push_str("    </Program>\n");
        xml.push_str("</UVI4>\n");
        xml
    }

    /// Writes the program to `<root>/<sound bank>/<category>/<name>.uvip`.
    pub fn write(&self, root: &Path, sound_bank: &str, category: &str, name: &str) -> PathBuf {
        let folder = root.join(sound_bank).join(category);
        fs::create_dir_all(&folder).expect("unable to create category folder");
        let path = folder.join(format!("{}.uvip", name));
        fs::write(&path, self.to_xml()).expect("unable to write program");
        path
    }
}

fn connections(indent: &str, sources: impl Iterator<Item = (String, String)>) -> String {
    let lines: Vec<String> = sources
        .map(|(source, destination)| {
            format!(
                "{}    <SignalConnection Ratio=\"1\" Source=\"{}\" Destination=\"{}\"/>\n",
                indent, source, destination
            )
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("{}<Connections>\n{}{}</Connections>\n", indent, lines.concat(), indent)
}

/// Settings with the usual CC layout: continuous CCs 31-46, toggles 112-119
/// and CC 34 standing in for the mod wheel.
pub fn settings(root: &Path) -> Settings {
    Settings::new(
        Folders {
            programs: root.join("programs"),
            original_programs: root.join("original"),
            template_programs: root.join("templates"),
        },
        MidiForMacros::new(
            34,
            vec![CcRange::new(31, 46)],
            vec![CcRange::new(112, 119)],
        ),
    )
}
