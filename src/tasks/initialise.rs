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
use crate::error::{Error, Result};
use crate::layout::{move_macros_to_end, move_macros_to_standard_layout, reorder_macros_by_location};
use crate::program::Program;
use crate::sound_banks;

use super::{organic_pads, TaskContext};

/// Removes the GUI script processor where allowed, then puts the macros into
/// the standard layout and applies the sound bank's own adjustments.
pub(super) fn initialise_layout(program: &mut Program, context: &TaskContext) -> Result<()> {
    remove_gui_script_processor(program, context)?;

    let rows_first = program.gui_script_processor().is_none();
    if reorder_macros_by_location(program, rows_first)? {
        context.report(program, "Put the macros in location order.");
    }
    let nudge = sound_banks::top_nudge(program.sound_bank(), program.uses_default_background());
    if move_macros_to_standard_layout(program, nudge)? {
        context.report(program, "Moved the macros into the standard layout.");
    }

    move_end_macros(program, context, nudge)?;
    if sound_banks::is_organic_pads(program.sound_bank()) {
        organic_pads::add_layer_gains_and_envelope(program, context)?;
    }
    Ok(())
}

fn remove_gui_script_processor(program: &mut Program, context: &TaskContext) -> Result<()> {
    if context
        .settings()
        .exceptions()
        .must_use_gui_script_processor(program.sound_bank_folder(), program.category())
    {
        return Ok(());
    }
    let Some(gui) = program.gui_script_processor() else {
        return Ok(());
    };
    if sound_banks::requires_gui_script_processor(program.sound_bank()) {
        return Err(Error::application(format!(
            "Removing the GUI script processor from {} programs is not supported. \
             Add sound bank '{}' to must_use_gui_script_processor in the settings.",
            program.sound_bank(),
            program.sound_bank_folder()
        )));
    }

    let name = program.script_processors()[gui].name().to_string();
    program.remove_script_processor(gui);
    context.report(program, format!("Removed GUI script processor '{}'.", name));
    Ok(())
}

/// Moves the macros the sound bank wants last to the end of the layout.
fn move_end_macros(program: &mut Program, context: &TaskContext, nudge: i32) -> Result<()> {
    let wanted = sound_banks::end_macros(program.sound_bank());
    if wanted.is_empty() {
        return Ok(());
    }
    let visible = program.visible_macro_indices();
    let indices: Vec<usize> = wanted
        .iter()
        .filter_map(|name| {
            visible.iter().copied().find(|&index| {
                program.macros()[index].display_name().eq_ignore_ascii_case(name)
            })
        })
        .collect();
    if move_macros_to_end(program, &indices)? {
        move_macros_to_standard_layout(program, nudge)?;
        context.report(
            program,
            format!("Moved {} to the end of the layout.", wanted.join(", ")),
        );
    }
    Ok(())
}
