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
//! Organic Pads programs get a macro per layer gain and replacement scripts
//! for the envelope and layer gains.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::program::{format_number, Program};

use super::TaskContext;

const DAHDSR_CONTROLLER: &str = "OrganicPads_DahdsrController";
const LAYER_GAINS: &str = "OrganicPads_LayerGains";
const SCRIPT_EXTENSION: &str = "lua";
const GAIN: &str = "Gain";

pub(super) fn add_layer_gains_and_envelope(program: &mut Program, context: &TaskContext) -> Result<()> {
    let folder = context
        .settings()
        .folders()
        .template_programs
        .join(program.sound_bank_folder());
    let scripts: Vec<(&str, PathBuf)> = [DAHDSR_CONTROLLER, LAYER_GAINS]
        .into_iter()
        .map(|name| (name, folder.join(format!("{}.{}", name, SCRIPT_EXTENSION))))
        .collect();
    if let Some((_, missing)) = scripts.iter().find(|(_, path)| !path.is_file()) {
        return Err(Error::application(format!(
            "Script {} is missing. Copy the Organic Pads scripts {}.{} and {}.{} into {}.",
            missing.display(),
            DAHDSR_CONTROLLER,
            SCRIPT_EXTENSION,
            LAYER_GAINS,
            SCRIPT_EXTENSION,
            folder.display()
        )));
    }

    let options = context.settings().organic_pads();
    for (name, path) in scripts.iter() {
        if program
            .program_script_processors()
            .any(|(_, script_processor)| script_processor.name() == *name)
        {
            continue;
        }
        let mut attributes = vec![
            ("Name", name.to_string()),
            ("Bypass", "0".to_string()),
            ("Script", path.display().to_string()),
        ];
        if *name == DAHDSR_CONTROLLER {
            attributes.push(("AttackTime", format_number(options.attack_seconds)));
            attributes.push(("ReleaseTime", format_number(options.release_seconds)));
        }
        program.add_script_processor(&attributes);
        context.report(program, format!("Added script processor '{}'.", name));
    }

    for layer_index in 0..program.layers().len() {
        let layer_name = program.layers()[layer_index].display_name().to_string();
        let Some(macro_index) = program
            .macros()
            .iter()
            .position(|m| m.display_name().eq_ignore_ascii_case(&layer_name))
        else {
            continue;
        };
        if program.connect_macro_to_layer(macro_index, layer_index, GAIN) {
            context.report(
                program,
                format!("Macro '{}' now controls the layer gain.", layer_name),
            );
        }
    }
    Ok(())
}
