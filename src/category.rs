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
//! Category folders and the template programs that hold their canonical CC maps.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::program::{Program, ScriptProcessorTemplate};
use crate::util;

/// A sound bank's category folder, resolved ready for editing.
pub struct Category {
    sound_bank: String,
    name: String,
    folder: PathBuf,
    template_path: Option<PathBuf>,
    template: Option<ScriptProcessorTemplate>,
    program_paths: Vec<PathBuf>,
}

impl Category {
    /// Resolves the programs and template for `<programs>/<sound bank>/<category>`.
    pub fn new(settings: &Settings, sound_bank: &str, name: &str) -> Result<Category> {
        let folder = settings.folders().programs.join(sound_bank).join(name);
        if !folder.is_dir() {
            return Err(Error::application(format!(
                "Category folder {} does not exist.",
                folder.display()
            )));
        }

        let must_use_gui = settings
            .exceptions()
            .must_use_gui_script_processor(sound_bank, name);
        let template_path = find_template(settings, sound_bank, name)?;
        let template = match (&template_path, must_use_gui) {
            (Some(path), true) => Some(template_script_processor(settings, path)?),
            (None, true) => {
                return Err(Error::application(format!(
                    "Category {}\\{} must use a GUI script processor, but there is no template program for it. \
                     Put one in {}.",
                    sound_bank,
                    name,
                    settings
                        .folders()
                        .template_programs
                        .join(sound_bank)
                        .join(name)
                        .display()
                )))
            }
            (_, false) => None,
        };

        let program_paths = match &template_path {
            Some(template_path) => {
                let template_path = canonical(template_path);
                util::program_files(&folder)?
                    .into_iter()
                    .filter(|path| canonical(path) != template_path)
                    .collect()
            }
            None => util::program_files(&folder)?,
        };
        if program_paths.is_empty() {
            return Err(Error::application(format!(
                "There are no programs in {}.",
                folder.display()
            )));
        }

        debug!(
            sound_bank,
            category = name,
            programs = program_paths.len(),
            template = ?template_path,
            "Resolved category"
        );
        Ok(Category {
            sound_bank: sound_bank.to_string(),
            name: name.to_string(),
            folder,
            template_path,
            template,
            program_paths,
        })
    }

    /// Gets the name of the sound bank folder.
    pub fn sound_bank(&self) -> &str {
        &self.sound_bank
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Gets the program files to edit, sorted by name.
    pub fn program_paths(&self) -> &[PathBuf] {
        &self.program_paths
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }

    /// Gets the script processor whose modulations are the category's CC map.
    /// Only categories that must keep their GUI script processor have one.
    pub fn template_script_processor(&self) -> Option<&ScriptProcessorTemplate> {
        self.template.as_ref()
    }
}

/// Looks for the template program: first in the category's own template
/// folder, then in the sound bank's only template folder if it has just one.
fn find_template(settings: &Settings, sound_bank: &str, name: &str) -> Result<Option<PathBuf>> {
    let sound_bank_folder = settings.folders().template_programs.join(sound_bank);
    let category_folder = sound_bank_folder.join(name);
    if let Some(path) = util::program_files(&category_folder)?.into_iter().next() {
        return Ok(Some(path));
    }
    if !sound_bank_folder.is_dir() {
        return Ok(None);
    }
    let subfolders = util::subfolder_names(&sound_bank_folder)?;
    if let [only] = subfolders.as_slice() {
        if let Some(path) = util::program_files(&sound_bank_folder.join(only))?
            .into_iter()
            .next()
        {
            info!(sound_bank, category = name, template = ?path, "Using sound bank template");
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Copies the GUI script processor out of a template program: the one named
/// for the sound bank in the settings, otherwise the last one.
fn template_script_processor(settings: &Settings, path: &Path) -> Result<ScriptProcessorTemplate> {
    let template = Program::read(path)?;
    let wanted = settings
        .gui_script_processor_name(template.sound_bank())
        .or_else(|| settings.gui_script_processor_name(template.sound_bank_folder()));
    let found = match wanted {
        Some(wanted) => template
            .program_script_processors()
            .find(|(_, script_processor)| script_processor.name() == wanted)
            .map(|(index, _)| index)
            .ok_or_else(|| {
                Error::application(format!(
                    "Template {} has no script processor named '{}'. \
                     Fix gui_script_processor_names in the settings.",
                    path.display(),
                    wanted
                ))
            })?,
        None => template
            .program_script_processors()
            .map(|(index, _)| index)
            .last()
            .ok_or_else(|| {
                Error::application(format!(
                    "Template {} has no script processor to copy the CC map from.",
                    path.display()
                ))
            })?,
    };
    Ok(template.script_processor_template(found))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
