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
use crate::cc::assign_macro_ccs;
use crate::error::Result;
use crate::layout::{move_macros_to_standard_layout, reorder_macros_by_location, wheel_insertion_index};
use crate::program::{Modulation, ModulationSource, NewMacro, Program, WHEEL};
use crate::sound_banks;

use super::TaskContext;

/// Replaces the mod wheel with a Wheel macro driven by the replacement CC.
/// Everything the mod wheel modulated is modulated by the Wheel macro instead.
pub(super) fn replace_mod_wheel_with_macro(program: &mut Program, context: &TaskContext) -> Result<()> {
    if let Some(reason) = not_replaceable(program) {
        context.report(program, reason);
        return Ok(());
    }

    reorder_macros_by_location(program, true)?;
    let index = wheel_insertion_index(program);
    let midi = context.settings().midi_for_macros();
    let index = program.insert_macro(
        index,
        &NewMacro {
            display_name: WHEEL.to_string(),
            value: 0.0,
            toggle: false,
            cc: midi.mod_wheel_replacement_cc(),
        },
    );
    let wheel = ModulationSource::Macro(program.macros()[index].name().to_string());
    let owners = program.replace_mod_wheel_modulations(&wheel);
    program.commit_and_reload()?;
    context.report(
        program,
        format!(
            "Added a Wheel macro on CC {} in place of the mod wheel for {}.",
            midi.mod_wheel_replacement_cc(),
            owners.join(", ")
        ),
    );

    let nudge = sound_banks::top_nudge(program.sound_bank(), program.uses_default_background());
    move_macros_to_standard_layout(program, nudge)?;
    assign_macro_ccs(program, midi)?;
    Ok(())
}

/// Gets why the mod wheel should stay as it is, if it should.
fn not_replaceable(program: &Program) -> Option<String> {
    if program.macros().iter().any(|m| m.is_wheel()) {
        return Some("The program already has a Wheel macro.".to_string());
    }

    let mod_wheel: Vec<(bool, f64)> = program
        .connections_parents()
        .iter()
        .flat_map(|parent| {
            let is_macro = program.macros().iter().any(|m| m.node() == parent.node());
            parent
                .modulations()
                .iter()
                .filter(|modulation| modulation.is_mod_wheel())
                .map(move |modulation: &Modulation| (is_macro, modulation.ratio()))
        })
        .collect();
    match mod_wheel.as_slice() {
        [] => Some("The mod wheel is not used.".to_string()),
        [(true, ratio)] if *ratio == 1.0 => {
            Some("The mod wheel already fully controls a single macro.".to_string())
        }
        _ => None,
    }
}
