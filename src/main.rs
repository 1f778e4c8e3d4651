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
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uvprog::batch::{Batch, BatchScript, BatchTask, CancellationToken, Parameter, RunOutcome, Scope};
use uvprog::config::Settings;
use uvprog::log::TracingLog;
use uvprog::tasks::TASK_NAMES;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A batch editor that standardizes sample-based synthesizer programs."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs one task over the programs in scope.
    RunTask {
        /// The path to the settings file.
        settings_path: String,
        /// The name of the task to run.
        task: String,
        /// The sound bank folder. Every sound bank if omitted.
        #[arg[short, long]]
        sound_bank: Option<String>,
        /// The category folder. Every category if omitted.
        #[arg[short, long]]
        category: Option<String>,
        /// The program name. Every program if omitted.
        #[arg[short, long]]
        program: Option<String>,
        /// A task parameter in the form <NAME>=<VALUE>. For example, OldCcNo=35.
        #[arg[long = "parameter"]]
        parameters: Vec<String>,
    },
    /// Runs the tasks of a batch script in their canonical order.
    RunScript {
        /// The path to the settings file.
        settings_path: String,
        /// The path to the batch script.
        script_path: String,
    },
    /// Validates a batch script and prints the order its tasks will run in.
    CheckScript {
        /// The path to the batch script.
        script_path: String,
    },
    /// Lists the task names.
    Tasks {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunTask {
            settings_path,
            task,
            sound_bank,
            category,
            program,
            parameters,
        } => {
            let mut converted_parameters: Vec<Parameter> = Vec::new();
            for parameter in parameters.iter() {
                let Some((name, value)) = parameter.split_once('=') else {
                    return Err(format!("malformed task parameter '{}'", parameter).into());
                };
                converted_parameters.push(Parameter {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                });
            }
            let scope = Scope::new(
                sound_bank.as_deref().unwrap_or_default(),
                category.as_deref().unwrap_or_default(),
                program.as_deref().unwrap_or_default(),
            );
            let script = BatchScript::new(vec![BatchTask::new(&task, &scope, converted_parameters)]);
            run(PathBuf::from(settings_path), script).await?;
        }
        Commands::RunScript {
            settings_path,
            script_path,
        } => {
            let script = BatchScript::read(&PathBuf::from(script_path))?;
            run(PathBuf::from(settings_path), script).await?;
        }
        Commands::CheckScript { script_path } => {
            let script = BatchScript::read(&PathBuf::from(&script_path))?;
            script.validate()?;

            println!("Tasks (count: {}):", script.tasks().len());
            for task in script.sequence_tasks() {
                println!("- {} on {}", task.name(), task.scope());
            }
        }
        Commands::Tasks {} => {
            println!("Tasks:");
            for name in TASK_NAMES.iter() {
                println!("- {}", name);
            }
        }
    }

    Ok(())
}

/// Runs a batch script on a blocking thread. Ctrl-C cancels the run after the
/// program being edited is saved.
async fn run(settings_path: PathBuf, script: BatchScript) -> Result<(), Box<dyn Error>> {
    let settings = Settings::read(&settings_path)?;
    let batch = Batch::new(settings, Arc::new(TracingLog));
    let cancel = CancellationToken::new();

    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancelling after the current program");
                cancel.cancel();
            }
        })
    };

    let outcome = tokio::task::spawn_blocking(move || batch.run_script(&script, &cancel)).await?;
    watcher.abort();

    match outcome {
        RunOutcome::Completed => {
            info!("Done");
            Ok(())
        }
        RunOutcome::Cancelled => Err("the batch run was cancelled".into()),
        RunOutcome::Failed(message) => Err(message.into()),
    }
}
