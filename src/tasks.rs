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
//! The catalog of named edits a batch can apply to programs.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::category::Category;
use crate::config::{Settings, MOD_WHEEL_CC};
use crate::error::{Error, Result};
use crate::log::Log;
use crate::program::Program;

mod arpeggiators;
mod ccs;
mod description;
mod initialise;
mod mod_wheel;
mod organic_pads;
mod queries;
mod restore;
#[cfg(test)]
mod tests;
mod values;

/// A named edit or query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigTask {
    RestoreOriginal,
    InitialiseLayout,
    UpdateMacroCcs,
    AssignMacroCcs,
    ChangeMacroCcNo { old: u8, new: u8 },
    RemoveDelayEffectsAndMacros,
    ZeroReverbMacros,
    ZeroReleaseMacro,
    MoveZeroedMacrosToEnd,
    InitialiseValuesAndMoveMacros,
    ReplaceModWheelWithMacro,
    ReuseCc1,
    RemoveArpeggiatorsAndSequencing,
    PrependPathLineToDescription,
    QueryAdsrMacros,
    QueryDahdsrModulations,
    QueryDelayTypes,
    QueryReverbTypes,
    QueryCountMacros,
    QueryReuseCc1NotSupported,
}

/// The names of every task.
pub const TASK_NAMES: [&str; 20] = [
    "RestoreOriginal",
    "InitialiseLayout",
    "UpdateMacroCcs",
    "AssignMacroCcs",
    "ChangeMacroCcNo",
    "RemoveDelayEffectsAndMacros",
    "ZeroReverbMacros",
    "ZeroReleaseMacro",
    "MoveZeroedMacrosToEnd",
    "InitialiseValuesAndMoveMacros",
    "ReplaceModWheelWithMacro",
    "ReuseCc1",
    "RemoveArpeggiatorsAndSequencing",
    "PrependPathLineToDescription",
    "QueryAdsrMacros",
    "QueryDahdsrModulations",
    "QueryDelayTypes",
    "QueryReverbTypes",
    "QueryCountMacros",
    "QueryReuseCc1NotSupported",
];

const OLD_CC_NO: &str = "OldCcNo";
const NEW_CC_NO: &str = "NewCcNo";

impl ConfigTask {
    /// Gets the task's name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigTask::RestoreOriginal => TASK_NAMES[0],
            ConfigTask::InitialiseLayout => TASK_NAMES[1],
            ConfigTask::UpdateMacroCcs => TASK_NAMES[2],
            ConfigTask::AssignMacroCcs => TASK_NAMES[3],
            ConfigTask::ChangeMacroCcNo { .. } => TASK_NAMES[4],
            ConfigTask::RemoveDelayEffectsAndMacros => TASK_NAMES[5],
            ConfigTask::ZeroReverbMacros => TASK_NAMES[6],
            ConfigTask::ZeroReleaseMacro => TASK_NAMES[7],
            ConfigTask::MoveZeroedMacrosToEnd => TASK_NAMES[8],
            ConfigTask::InitialiseValuesAndMoveMacros => TASK_NAMES[9],
            ConfigTask::ReplaceModWheelWithMacro => TASK_NAMES[10],
            ConfigTask::ReuseCc1 => TASK_NAMES[11],
            ConfigTask::RemoveArpeggiatorsAndSequencing => TASK_NAMES[12],
            ConfigTask::PrependPathLineToDescription => TASK_NAMES[13],
            ConfigTask::QueryAdsrMacros => TASK_NAMES[14],
            ConfigTask::QueryDahdsrModulations => TASK_NAMES[15],
            ConfigTask::QueryDelayTypes => TASK_NAMES[16],
            ConfigTask::QueryReverbTypes => TASK_NAMES[17],
            ConfigTask::QueryCountMacros => TASK_NAMES[18],
            ConfigTask::QueryReuseCc1NotSupported => TASK_NAMES[19],
        }
    }

    /// Makes a task from its name and parameters. Only ChangeMacroCcNo takes
    /// parameters: OldCcNo and NewCcNo.
    pub fn from_name(name: &str, parameters: &[(String, String)]) -> Result<ConfigTask> {
        let task = match name {
            "RestoreOriginal" => ConfigTask::RestoreOriginal,
            "InitialiseLayout" => ConfigTask::InitialiseLayout,
            "UpdateMacroCcs" => ConfigTask::UpdateMacroCcs,
            "AssignMacroCcs" => ConfigTask::AssignMacroCcs,
            "ChangeMacroCcNo" => ConfigTask::ChangeMacroCcNo {
                old: cc_parameter(parameters, OLD_CC_NO)?,
                new: cc_parameter(parameters, NEW_CC_NO)?,
            },
            "RemoveDelayEffectsAndMacros" => ConfigTask::RemoveDelayEffectsAndMacros,
            "ZeroReverbMacros" => ConfigTask::ZeroReverbMacros,
            "ZeroReleaseMacro" => ConfigTask::ZeroReleaseMacro,
            "MoveZeroedMacrosToEnd" => ConfigTask::MoveZeroedMacrosToEnd,
            "InitialiseValuesAndMoveMacros" => ConfigTask::InitialiseValuesAndMoveMacros,
            "ReplaceModWheelWithMacro" => ConfigTask::ReplaceModWheelWithMacro,
            "ReuseCc1" => ConfigTask::ReuseCc1,
            "RemoveArpeggiatorsAndSequencing" => ConfigTask::RemoveArpeggiatorsAndSequencing,
            "PrependPathLineToDescription" => ConfigTask::PrependPathLineToDescription,
            "QueryAdsrMacros" => ConfigTask::QueryAdsrMacros,
            "QueryDahdsrModulations" => ConfigTask::QueryDahdsrModulations,
            "QueryDelayTypes" => ConfigTask::QueryDelayTypes,
            "QueryReverbTypes" => ConfigTask::QueryReverbTypes,
            "QueryCountMacros" => ConfigTask::QueryCountMacros,
            "QueryReuseCc1NotSupported" => ConfigTask::QueryReuseCc1NotSupported,
            _ => {
                return Err(Error::application(format!(
                    "'{}' is not a valid task name. Valid names are: {}.",
                    name,
                    TASK_NAMES.join(", ")
                )))
            }
        };
        Ok(task)
    }

    /// Returns true if the name belongs to a task.
    pub fn is_valid_name(name: &str) -> bool {
        TASK_NAMES.contains(&name)
    }

    /// Returns true for tasks that only report on programs.
    pub fn is_query(&self) -> bool {
        self.name().starts_with("Query")
    }

    /// Gets why the task must not run on a sound bank or one of its
    /// categories, if the settings exclude it.
    pub fn exclusion(&self, settings: &Settings, sound_bank: &str, category: Option<&str>) -> Option<String> {
        let exceptions = settings.exceptions();
        let (must_use_gui, keep_mod_wheel, keep_reverb) = match category {
            Some(category) => (
                exceptions.must_use_gui_script_processor(sound_bank, category),
                exceptions.do_not_replace_mod_wheel(sound_bank, category),
                exceptions.do_not_zero_reverb(sound_bank, category),
            ),
            None => (
                exceptions.sound_bank_must_use_gui_script_processor(sound_bank),
                exceptions.sound_bank_does_not_replace_mod_wheel(sound_bank),
                exceptions.sound_bank_does_not_zero_reverb(sound_bank),
            ),
        };
        let scope = match category {
            Some(category) => format!("{}\\{}", sound_bank, category),
            None => sound_bank.to_string(),
        };
        match self {
            ConfigTask::ReplaceModWheelWithMacro | ConfigTask::ReuseCc1 if keep_mod_wheel => Some(format!(
                "{}: skipping {}, the mod wheel is not to be replaced.",
                scope,
                self.name()
            )),
            ConfigTask::ReplaceModWheelWithMacro
            | ConfigTask::ReuseCc1
            | ConfigTask::MoveZeroedMacrosToEnd
                if must_use_gui =>
            {
                Some(format!(
                    "{}: skipping {}, the Info page must stay defined by its GUI script processor.",
                    scope,
                    self.name()
                ))
            }
            ConfigTask::ZeroReverbMacros if keep_reverb => Some(format!(
                "{}: skipping {}, reverb is not to be zeroed.",
                scope,
                self.name()
            )),
            _ => None,
        }
    }

    /// Runs the task on one program file. Edited programs are saved.
    pub fn run(&self, path: &Path, context: &TaskContext) -> Result<()> {
        match *self {
            ConfigTask::RestoreOriginal => restore::restore_original(path, context),
            ConfigTask::InitialiseLayout => edit(path, context, initialise::initialise_layout),
            ConfigTask::UpdateMacroCcs => edit(path, context, ccs::update_macro_ccs),
            ConfigTask::AssignMacroCcs => edit(path, context, ccs::assign_macro_ccs),
            ConfigTask::ChangeMacroCcNo { old, new } => edit(path, context, |program, context| {
                ccs::change_macro_cc_no(program, context, old, new)
            }),
            ConfigTask::RemoveDelayEffectsAndMacros => {
                edit(path, context, values::remove_delay_effects_and_macros)
            }
            ConfigTask::ZeroReverbMacros => edit(path, context, values::zero_reverb_macros),
            ConfigTask::ZeroReleaseMacro => edit(path, context, values::zero_release_macro),
            ConfigTask::MoveZeroedMacrosToEnd => {
                edit(path, context, values::move_zeroed_macros_to_end)
            }
            ConfigTask::InitialiseValuesAndMoveMacros => {
                edit(path, context, values::initialise_values_and_move_macros)
            }
            ConfigTask::ReplaceModWheelWithMacro => {
                edit(path, context, mod_wheel::replace_mod_wheel_with_macro)
            }
            ConfigTask::ReuseCc1 => edit(path, context, ccs::reuse_cc1),
            ConfigTask::RemoveArpeggiatorsAndSequencing => {
                edit(path, context, arpeggiators::remove_arpeggiators_and_sequencing)
            }
            ConfigTask::PrependPathLineToDescription => {
                edit(path, context, description::prepend_path_line)
            }
            ConfigTask::QueryAdsrMacros => edit(path, context, |program, context| {
                queries::adsr_macros(program, context)
            }),
            ConfigTask::QueryDahdsrModulations => edit(path, context, |program, context| {
                queries::dahdsr_modulations(program, context)
            }),
            ConfigTask::QueryDelayTypes => edit(path, context, |program, context| {
                queries::delay_types(program, context)
            }),
            ConfigTask::QueryReverbTypes => edit(path, context, |program, context| {
                queries::reverb_types(program, context)
            }),
            ConfigTask::QueryCountMacros => edit(path, context, |program, context| {
                queries::count_macros(program, context)
            }),
            ConfigTask::QueryReuseCc1NotSupported => edit(path, context, |program, context| {
                queries::reuse_cc1_not_supported(program, context)
            }),
        }
    }
}

impl fmt::Display for ConfigTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigTask::ChangeMacroCcNo { old, new } => {
                write!(f, "{} ({} to {})", self.name(), old, new)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for ConfigTask {
    type Err = Error;

    fn from_str(s: &str) -> Result<ConfigTask> {
        ConfigTask::from_name(s, &[])
    }
}

/// What a task needs besides the program itself.
pub struct TaskContext<'a> {
    settings: &'a Settings,
    category: Option<&'a Category>,
    log: &'a dyn Log,
}

impl<'a> TaskContext<'a> {
    pub fn new(settings: &'a Settings, log: &'a dyn Log) -> TaskContext<'a> {
        TaskContext {
            settings,
            category: None,
            log,
        }
    }

    /// Attaches the resolved category of the programs being edited.
    pub fn with_category(mut self, category: &'a Category) -> TaskContext<'a> {
        self.category = Some(category);
        self
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn category(&self) -> Option<&'a Category> {
        self.category
    }

    /// Writes a line about a program to the log.
    pub fn report(&self, program: &Program, message: impl fmt::Display) {
        self.report_path(program.path(), message);
    }

    /// Writes a line about a program file to the log.
    pub fn report_path(&self, path: &Path, message: impl fmt::Display) {
        let category = path.parent();
        let sound_bank = category.and_then(Path::parent);
        let name = |path: Option<&Path>| {
            path.and_then(Path::file_name)
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        let program = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        self.log.write_line(&format!(
            "{}\\{}\\{}: {}",
            name(sound_bank),
            name(category),
            program,
            message
        ));
    }

    /// Writes a line to the log.
    pub fn write_line(&self, line: &str) {
        self.log.write_line(line);
    }
}

/// Reads a program, applies an edit and saves the program if it changed.
fn edit<F>(path: &Path, context: &TaskContext, task: F) -> Result<()>
where
    F: FnOnce(&mut Program, &TaskContext) -> Result<()>,
{
    let mut program = Program::read(path)?;
    task(&mut program, context)?;
    if program.is_updated() {
        program.save()?;
        debug!(path = ?path, "Saved program");
    }
    Ok(())
}

/// Moves the macros into the standard layout and renumbers their CCs.
fn relayout(program: &mut Program, context: &TaskContext) -> Result<()> {
    let nudge = crate::sound_banks::top_nudge(program.sound_bank(), program.uses_default_background());
    crate::layout::move_macros_to_standard_layout(program, nudge)?;
    ccs::update_macro_ccs(program, context)
}

fn cc_parameter(parameters: &[(String, String)], name: &str) -> Result<u8> {
    let value = parameters
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
        .ok_or_else(|| {
            Error::application(format!(
                "ChangeMacroCcNo needs a {} parameter.",
                name
            ))
        })?;
    match value.parse::<u8>() {
        Ok(cc) if cc <= 127 && cc != MOD_WHEEL_CC => Ok(cc),
        _ => Err(Error::application(format!(
            "{} must be a MIDI CC number from 0 to 127 other than the mod wheel ({}), not '{}'.",
            name, MOD_WHEEL_CC, value
        ))),
    }
}
