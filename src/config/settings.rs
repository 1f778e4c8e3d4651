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
use std::fs;
use std::path::{Path, PathBuf};

use ::config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use super::exceptions::Exceptions;
use super::midi::MidiForMacros;

/// The folders the engine reads and writes. Each holds
/// `<sound bank>/<category>/<program>.uvip`.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Folders {
    /// The working programs that tasks edit in place.
    pub programs: PathBuf,
    /// The pristine programs restored by the RestoreOriginal task.
    pub original_programs: PathBuf,
    /// The template programs that supply the canonical CC maps.
    pub template_programs: PathBuf,
}

/// Names the template script processor to use for a sound bank when the last
/// script processor of its template programs is not the right one.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NamedScriptProcessor {
    pub sound_bank: String,
    pub name: String,
}

/// Options for the Organic Pads sound bank, whose envelopes are driven by a
/// replacement script processor.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct OrganicPads {
    #[serde(default = "default_attack_seconds")]
    pub attack_seconds: f64,
    #[serde(default = "default_release_seconds")]
    pub release_seconds: f64,
}

fn default_attack_seconds() -> f64 {
    0.02
}

fn default_release_seconds() -> f64 {
    0.3
}

impl Default for OrganicPads {
    fn default() -> Self {
        OrganicPads {
            attack_seconds: default_attack_seconds(),
            release_seconds: default_release_seconds(),
        }
    }
}

/// The policy values the engine consumes.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Settings {
    /// The program folders.
    folders: Folders,
    /// The CC numbers used for macros.
    midi_for_macros: MidiForMacros,
    /// Sound banks and categories that rules do not apply to.
    #[serde(default)]
    exceptions: Exceptions,
    /// Template script processor names by sound bank.
    #[serde(default)]
    gui_script_processor_names: Vec<NamedScriptProcessor>,
    /// Organic Pads options.
    #[serde(default)]
    organic_pads: OrganicPads,
}

impl Settings {
    /// Creates settings with no exceptions and default sound bank options.
    pub fn new(folders: Folders, midi_for_macros: MidiForMacros) -> Settings {
        Settings {
            folders,
            midi_for_macros,
            exceptions: Exceptions::default(),
            gui_script_processor_names: Vec::new(),
            organic_pads: OrganicPads::default(),
        }
    }

    /// Replaces the exception lists.
    pub fn with_exceptions(mut self, exceptions: Exceptions) -> Settings {
        self.exceptions = exceptions;
        self
    }

    /// Replaces the template script processor names.
    pub fn with_gui_script_processor_names(mut self, names: Vec<NamedScriptProcessor>) -> Settings {
        self.gui_script_processor_names = names;
        self
    }

    /// Reads and validates settings from a YAML file.
    pub fn read(path: &Path) -> Result<Settings, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to a YAML file at the given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_yml::to_string(self)?;
        fs::write(path, serialized)?;
        info!(path = ?path, "Saved settings");
        Ok(())
    }

    /// Checks the settings for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.midi_for_macros.validate()?;
        if self.organic_pads.attack_seconds < 0.0 || self.organic_pads.release_seconds < 0.0 {
            return Err(ConfigError::Invalid(
                "Organic Pads attack and release times cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Gets the folders.
    pub fn folders(&self) -> &Folders {
        &self.folders
    }

    /// Gets the MIDI CC configuration for macros.
    pub fn midi_for_macros(&self) -> &MidiForMacros {
        &self.midi_for_macros
    }

    /// Gets the exception lists.
    pub fn exceptions(&self) -> &Exceptions {
        &self.exceptions
    }

    /// Gets the configured template script processor name for a sound bank.
    pub fn gui_script_processor_name(&self, sound_bank: &str) -> Option<&str> {
        self.gui_script_processor_names
            .iter()
            .find(|named| named.sound_bank.eq_ignore_ascii_case(sound_bank))
            .map(|named| named.name.as_str())
    }

    /// Gets the Organic Pads options.
    pub fn organic_pads(&self) -> &OrganicPads {
        &self.organic_pads
    }
}
