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
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::tasks::ConfigTask;

use super::orchestrator::Scope;

/// The order a batch script's tasks run in. Tasks not listed here run after
/// these, in the order they appear in the script.
pub const CANONICAL_ORDER: [ConfigTask; 7] = [
    ConfigTask::RestoreOriginal,
    ConfigTask::InitialiseLayout,
    ConfigTask::UpdateMacroCcs,
    ConfigTask::RemoveDelayEffectsAndMacros,
    ConfigTask::InitialiseValuesAndMoveMacros,
    ConfigTask::ReplaceModWheelWithMacro,
    ConfigTask::ReuseCc1,
];

const ALL: &str = "All";

/// A name/value parameter of a batch script task.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    #[serde(rename = "@Name")]
    pub name: String,
    #[serde(rename = "@Value")]
    pub value: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
struct Parameters {
    #[serde(rename = "Parameter", default)]
    parameters: Vec<Parameter>,
}

/// One task of a batch script and the programs it applies to. An empty or
/// `All` scope attribute means the level is not restricted.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BatchTask {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@SoundBank", default)]
    sound_bank: String,
    #[serde(rename = "@Category", default)]
    category: String,
    #[serde(rename = "@Program", default)]
    program: String,
    #[serde(rename = "Parameters", default, skip_serializing_if = "Option::is_none")]
    parameters: Option<Parameters>,
}

impl BatchTask {
    /// Creates a batch script task.
    pub fn new(name: &str, scope: &Scope, parameters: Vec<Parameter>) -> BatchTask {
        let level = |value: &Option<String>| value.clone().unwrap_or_else(|| ALL.to_string());
        BatchTask {
            name: name.to_string(),
            sound_bank: level(&scope.sound_bank),
            category: level(&scope.category),
            program: level(&scope.program),
            parameters: (!parameters.is_empty()).then_some(Parameters { parameters }),
        }
    }

    /// Gets the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the programs the task applies to.
    pub fn scope(&self) -> Scope {
        Scope::new(&self.sound_bank, &self.category, &self.program)
    }

    /// Gets the task's parameters.
    pub fn parameters(&self) -> &[Parameter] {
        self.parameters
            .as_ref()
            .map(|parameters| parameters.parameters.as_slice())
            .unwrap_or_default()
    }

    /// Makes the task this entry names.
    pub fn task(&self) -> Result<ConfigTask> {
        let parameters: Vec<(String, String)> = self
            .parameters()
            .iter()
            .map(|parameter| (parameter.name.clone(), parameter.value.clone()))
            .collect();
        ConfigTask::from_name(self.name.trim(), &parameters)
    }
}

/// An ordered list of tasks to run, saved as XML.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename = "Batch")]
pub struct BatchScript {
    #[serde(rename = "Task", default)]
    tasks: Vec<BatchTask>,
}

impl BatchScript {
    /// Creates a batch script.
    pub fn new(tasks: Vec<BatchTask>) -> BatchScript {
        BatchScript { tasks }
    }

    /// Parses a batch script.
    pub fn parse(text: &str) -> Result<BatchScript> {
        Ok(quick_xml::de::from_str(text)?)
    }

    /// Reads a batch script file.
    pub fn read(path: &Path) -> Result<BatchScript> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        BatchScript::parse(&text)
    }

    /// Serializes the script.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        let mut serializer = quick_xml::se::Serializer::new(&mut xml);
        serializer.indent(' ', 2);
        self.serialize(serializer)?;
        xml.push('\n');
        Ok(xml)
    }

    /// Writes the script to a file.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_xml_string()?).map_err(|e| Error::io(path, e))?;
        info!(path = ?path, tasks = self.tasks.len(), "Saved batch script");
        Ok(())
    }

    /// Gets the tasks in the order they were written.
    pub fn tasks(&self) -> &[BatchTask] {
        &self.tasks
    }

    /// Checks that every task is known and that no task is listed twice for
    /// the same programs.
    pub fn validate(&self) -> Result<()> {
        for (index, entry) in self.tasks.iter().enumerate() {
            entry.task()?;
            let scope = entry.scope();
            scope.validate()?;
            let duplicate = self.tasks[..index]
                .iter()
                .any(|earlier| earlier.name.trim() == entry.name.trim() && earlier.scope() == scope);
            if duplicate {
                return Err(Error::application(format!(
                    "Task {} for {} is in the batch script more than once. Remove the duplicate.",
                    entry.name.trim(),
                    scope
                )));
            }
        }
        Ok(())
    }

    /// Gets the tasks in the order they must run: the canonical tasks first,
    /// grouped by task, then the rest. Tasks keep their script order within
    /// each group.
    pub fn sequence_tasks(&self) -> Vec<&BatchTask> {
        let rank = |entry: &BatchTask| {
            CANONICAL_ORDER
                .iter()
                .position(|task| task.name() == entry.name.trim())
                .unwrap_or(CANONICAL_ORDER.len())
        };
        let mut sequenced: Vec<&BatchTask> = self.tasks.iter().collect();
        sequenced.sort_by_key(|entry| rank(entry));
        sequenced
    }
}
