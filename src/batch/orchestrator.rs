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
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, span, warn, Level, Span};

use crate::category::Category;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::log::Log;
use crate::tasks::{ConfigTask, TaskContext};
use crate::util;

use super::cancel::CancellationToken;
use super::script::BatchScript;

const ALL: &str = "All";

/// The programs a task applies to. A level that is not given covers every
/// folder at that level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    pub sound_bank: Option<String>,
    pub category: Option<String>,
    pub program: Option<String>,
}

impl Scope {
    /// Every program in every sound bank.
    pub fn all() -> Scope {
        Scope::default()
    }

    /// Creates a scope. Empty or `All` levels are not given.
    pub fn new(sound_bank: &str, category: &str, program: &str) -> Scope {
        let level = |value: &str| {
            let value = value.trim();
            (!value.is_empty() && !value.eq_ignore_ascii_case(ALL)).then(|| value.to_string())
        };
        Scope {
            sound_bank: level(sound_bank),
            category: level(category),
            program: level(program),
        }
    }

    /// Checks that each given level has its parent level given too.
    pub fn validate(&self) -> Result<()> {
        if self.category.is_some() && self.sound_bank.is_none() {
            return Err(Error::application(format!(
                "{} names a category but no sound bank. Give the sound bank too.",
                self
            )));
        }
        if self.program.is_some() && self.category.is_none() {
            return Err(Error::application(format!(
                "{} names a program but no category. Give the sound bank and category too.",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<&str> = [&self.sound_bank, &self.category, &self.program]
            .into_iter()
            .map(|level| level.as_deref().unwrap_or(ALL))
            .collect();
        f.write_str(&levels.join("\\"))
    }
}

/// Where a batch run is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    ResolvingScope,
    ProcessingProgram,
    Cancelled,
    Finished,
    Failed,
}

/// How a batch run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

type RunEnded = Box<dyn Fn(&RunOutcome) + Send + Sync>;

/// Runs tasks over programs, one program at a time.
pub struct Batch {
    settings: Settings,
    log: Arc<dyn Log>,
    state: Mutex<BatchState>,
    run_ended: Mutex<Vec<RunEnded>>,
    /// The logging span.
    span: Span,
}

impl Batch {
    /// Creates a new batch runner.
    pub fn new(settings: Settings, log: Arc<dyn Log>) -> Batch {
        Batch {
            settings,
            log,
            state: Mutex::new(BatchState::Idle),
            run_ended: Mutex::new(Vec::new()),
            span: span!(Level::INFO, "batch"),
        }
    }

    /// Gets the settings the batch runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the current state.
    pub fn state(&self) -> BatchState {
        *self.state.lock()
    }

    /// Registers a callback for the end of every script run, however it ends.
    pub fn on_run_ended(&self, callback: impl Fn(&RunOutcome) + Send + Sync + 'static) {
        self.run_ended.lock().push(Box::new(callback));
    }

    /// Validates a batch script, puts its tasks into their canonical order
    /// and runs them. Errors end the run and are reported in the outcome.
    pub fn run_script(&self, script: &BatchScript, cancel: &CancellationToken) -> RunOutcome {
        let _enter = self.span.enter();
        let outcome = match self.run_script_tasks(script, cancel) {
            Ok(()) => {
                self.log.write_line("The batch run finished.");
                RunOutcome::Completed
            }
            Err(Error::Cancelled) => {
                warn!("Batch run cancelled");
                self.log.write_line("The batch run was cancelled.");
                RunOutcome::Cancelled
            }
            Err(e) => {
                error!(err = ?e, "Batch run failed");
                self.log.write_line(&format!("Error: {}", e));
                RunOutcome::Failed(e.to_string())
            }
        };
        self.set_state(match outcome {
            RunOutcome::Completed => BatchState::Finished,
            RunOutcome::Cancelled => BatchState::Cancelled,
            RunOutcome::Failed(_) => BatchState::Failed,
        });
        for callback in self.run_ended.lock().iter() {
            callback(&outcome);
        }
        outcome
    }

    fn run_script_tasks(&self, script: &BatchScript, cancel: &CancellationToken) -> Result<()> {
        script.validate()?;
        for entry in script.sequence_tasks() {
            let task = entry.task()?;
            let scope = entry.scope();
            info!(task = %task, scope = %scope, "Running task");
            self.log
                .write_line(&format!("Running {} on {}.", task, scope));
            self.run_scope(task, &scope, cancel)?;
        }
        Ok(())
    }

    /// Runs one task over every program in the scope. Sound banks and
    /// categories the settings exclude from the task are skipped with a log line.
    pub fn run_task(&self, task: ConfigTask, scope: &Scope, cancel: &CancellationToken) -> Result<()> {
        let _enter = self.span.enter();
        let result = self.run_scope(task, scope, cancel);
        self.set_state(match &result {
            Ok(()) => BatchState::Finished,
            Err(Error::Cancelled) => BatchState::Cancelled,
            Err(_) => BatchState::Failed,
        });
        result
    }

    fn run_scope(&self, task: ConfigTask, scope: &Scope, cancel: &CancellationToken) -> Result<()> {
        self.set_state(BatchState::ResolvingScope);
        scope.validate()?;
        let root = self.root(task);
        let sound_banks = match &scope.sound_bank {
            Some(sound_bank) => vec![sound_bank.clone()],
            None => util::subfolder_names(root)?,
        };

        for sound_bank in sound_banks {
            if let Some(reason) = task.exclusion(&self.settings, &sound_bank, None) {
                self.log.write_line(&reason);
                continue;
            }
            let sound_bank_folder = root.join(&sound_bank);
            if !sound_bank_folder.is_dir() {
                return Err(Error::application(format!(
                    "Sound bank folder {} does not exist.",
                    sound_bank_folder.display()
                )));
            }
            let categories = match &scope.category {
                Some(category) => vec![category.clone()],
                None => util::subfolder_names(&sound_bank_folder)?,
            };
            for category in categories {
                if let Some(reason) = task.exclusion(&self.settings, &sound_bank, Some(&category)) {
                    self.log.write_line(&reason);
                    continue;
                }
                self.run_category(task, &sound_bank, &category, scope.program.as_deref(), cancel)?;
            }
        }
        Ok(())
    }

    fn run_category(
        &self,
        task: ConfigTask,
        sound_bank: &str,
        category: &str,
        program: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let resolved = match task {
            // The working copies may not exist yet, so restoring walks the originals.
            ConfigTask::RestoreOriginal => None,
            _ => Some(Category::new(&self.settings, sound_bank, category)?),
        };
        let paths = match &resolved {
            Some(resolved) => resolved.program_paths().to_vec(),
            None => self.original_program_paths(sound_bank, category)?,
        };
        let paths = select_program(paths, program).ok_or_else(|| {
            Error::application(format!(
                "There is no program {} in {}\\{}.",
                program.unwrap_or_default(),
                sound_bank,
                category
            ))
        })?;

        let context = TaskContext::new(&self.settings, self.log.as_ref());
        let context = match &resolved {
            Some(resolved) => context.with_category(resolved),
            None => context,
        };
        for path in paths {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.set_state(BatchState::ProcessingProgram);
            debug!(task = %task, program = ?path, "Processing program");
            task.run(&path, &context)?;
        }
        Ok(())
    }

    /// Gets the working paths of the programs in a category of the originals mirror.
    fn original_program_paths(&self, sound_bank: &str, category: &str) -> Result<Vec<PathBuf>> {
        let folders = self.settings.folders();
        let originals = folders.original_programs.join(sound_bank).join(category);
        if !originals.is_dir() {
            return Err(Error::application(format!(
                "Original category folder {} does not exist.",
                originals.display()
            )));
        }
        let working = folders.programs.join(sound_bank).join(category);
        Ok(util::program_files(&originals)?
            .into_iter()
            .filter_map(|path| path.file_name().map(|name| working.join(name)))
            .collect())
    }

    fn root(&self, task: ConfigTask) -> &Path {
        let folders = self.settings.folders();
        match task {
            ConfigTask::RestoreOriginal => &folders.original_programs,
            _ => &folders.programs,
        }
    }

    fn set_state(&self, state: BatchState) {
        *self.state.lock() = state;
    }
}

/// Narrows the paths to the named program. The name may leave off the extension.
fn select_program(paths: Vec<PathBuf>, program: Option<&str>) -> Option<Vec<PathBuf>> {
    let Some(program) = program else {
        return Some(paths);
    };
    let matches = |name: Option<&std::ffi::OsStr>| {
        name.is_some_and(|name| name.to_string_lossy().eq_ignore_ascii_case(program))
    };
    paths
        .into_iter()
        .find(|path| matches(path.file_stem()) || matches(path.file_name()))
        .map(|path| vec![path])
}
