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
use crate::category::Category;
use crate::cc;
use crate::config::{MidiForMacros, MOD_WHEEL_CC};
use crate::error::{Error, Result};
use crate::layout::location_order;
use crate::program::{Modulation, Program};

use super::TaskContext;

/// Copies the category's template CC map into the program's GUI script
/// processor, or numbers the macros when the category has no template.
pub(super) fn update_macro_ccs(program: &mut Program, context: &TaskContext) -> Result<()> {
    let Some(template) = context.category().and_then(Category::template_script_processor) else {
        return assign_macro_ccs(program, context);
    };

    let target = program
        .program_script_processors()
        .find(|(_, script_processor)| script_processor.name() == template.name())
        .map(|(index, _)| index)
        .or_else(|| program.gui_script_processor())
        .or_else(|| program.program_script_processors().map(|(index, _)| index).last())
        .ok_or_else(|| {
            Error::application(format!(
                "{} has no script processor to copy the '{}' CC map into. \
                 Restore the original program or remove its category from must_use_gui_script_processor.",
                program.path().display(),
                template.name()
            ))
        })?;
    if program.copy_cc_map(target, template) {
        let name = program.script_processors()[target].name().to_string();
        context.report(
            program,
            format!("Copied the template CC map into script processor '{}'.", name),
        );
    }
    Ok(())
}

/// Numbers the visible macros' CCs in location order.
pub(super) fn assign_macro_ccs(program: &mut Program, context: &TaskContext) -> Result<()> {
    if cc::assign_macro_ccs(program, context.settings().midi_for_macros())? {
        let summary: Vec<String> = program
            .macros()
            .iter()
            .filter_map(|m| m.cc().map(|cc| format!("{}={}", m.display_name(), cc)))
            .collect();
        context.report(program, format!("Macro CCs: {}.", summary.join(", ")));
    }
    Ok(())
}

/// Moves every macro mapped to one CC number onto another.
pub(super) fn change_macro_cc_no(
    program: &mut Program,
    context: &TaskContext,
    old: u8,
    new: u8,
) -> Result<()> {
    let targets: Vec<usize> = (0..program.macros().len())
        .filter(|&index| program.macros()[index].cc() == Some(old))
        .collect();
    for index in targets {
        if program.set_macro_cc(index, new) {
            let name = program.macros()[index].display_name().to_string();
            context.report(
                program,
                format!("Changed macro '{}' from CC {} to CC {}.", name, old, new),
            );
        }
    }
    Ok(())
}

/// Gives CC 1 to the continuous macro after the one holding the mod wheel
/// replacement CC, then renumbers the macros after it.
pub(super) fn reuse_cc1(program: &mut Program, context: &TaskContext) -> Result<()> {
    let midi = context.settings().midi_for_macros();
    match reuse_cc1_target(program, midi) {
        Err(reason) => {
            context.report(program, format!("Cannot reuse CC 1: {}", reason));
            Ok(())
        }
        Ok(None) => Ok(()),
        Ok(Some(index)) => {
            program.set_macro_cc(index, MOD_WHEEL_CC);
            let name = program.macros()[index].display_name().to_string();
            context.report(program, format!("Macro '{}' now uses CC 1.", name));
            cc::assign_macro_ccs(program, midi)?;
            Ok(())
        }
    }
}

/// Finds the macro that should take CC 1. Gives `None` if it already has it
/// and the reason when the program does not support it.
pub(super) fn reuse_cc1_target(
    program: &Program,
    midi: &MidiForMacros,
) -> std::result::Result<Option<usize>, String> {
    let macros = program.macros();
    let replacement = midi.mod_wheel_replacement_cc();
    let visible = program.visible_macro_indices();
    let order = location_order(macros, &visible, program.gui_script_processor().is_none());

    let holder = order
        .iter()
        .position(|&index| macros[index].is_wheel() || macros[index].cc() == Some(replacement))
        .ok_or_else(|| format!("no visible macro uses CC {}.", replacement))?;
    let next = order[holder + 1..]
        .iter()
        .copied()
        .find(|&index| macros[index].is_continuous())
        .ok_or_else(|| "no continuous macro follows the mod wheel replacement.".to_string())?;

    let has_wheel = macros.iter().any(|m| m.is_wheel());
    if !has_wheel {
        let next_node = macros[next].node();
        let unhandled = program.connections_parents().iter().any(|parent| {
            parent.node() != next_node && parent.modulations().iter().any(Modulation::is_mod_wheel)
        });
        if unhandled {
            return Err("the mod wheel is still in use. Run ReplaceModWheelWithMacro first.".to_string());
        }
    }

    if macros[next].is_modulated_by_mod_wheel() {
        Ok(None)
    } else {
        Ok(Some(next))
    }
}
