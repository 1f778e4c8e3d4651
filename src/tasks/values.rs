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
use crate::error::Result;
use crate::layout::{move_macros_to_end, remove_macros};
use crate::program::{Macro, Program};

use super::{relayout, TaskContext};

/// Bypasses delay effects and removes delay macros.
pub(super) fn remove_delay_effects_and_macros(program: &mut Program, context: &TaskContext) -> Result<()> {
    for index in 0..program.effects().len() {
        let effect = &program.effects()[index];
        if !effect.is_delay() || effect.is_bypassed() {
            continue;
        }
        let label = format!("{} '{}'", effect.effect_type(), effect.name());
        program.bypass_effect(index);
        context.report(program, format!("Bypassed {}.", label));
    }

    let mut removed = Vec::new();
    for index in 0..program.macros().len() {
        let m = &program.macros()[index];
        if !m.is_delay() {
            continue;
        }
        if program.is_wheel_modulated(index) {
            context.report(
                program,
                format!("Kept delay macro '{}', the mod wheel drives it.", m.display_name()),
            );
            continue;
        }
        removed.push(index);
    }
    if removed.is_empty() {
        return Ok(());
    }
    let names = display_names(program, &removed);
    remove_macros(program, &removed)?;
    context.report(program, format!("Removed delay macros {}.", names));
    relayout(program, context)
}

/// Zeroes the reverb macros.
pub(super) fn zero_reverb_macros(program: &mut Program, context: &TaskContext) -> Result<()> {
    if context
        .settings()
        .exceptions()
        .do_not_zero_reverb(program.sound_bank_folder(), program.category())
    {
        context.report(program, "Reverb is not zeroed for this category.");
        return Ok(());
    }
    zero_macros(program, context, Macro::is_reverb, "reverb")
}

/// Zeroes the release macros.
pub(super) fn zero_release_macro(program: &mut Program, context: &TaskContext) -> Result<()> {
    zero_macros(program, context, Macro::is_release, "release")
}

fn zero_macros(
    program: &mut Program,
    context: &TaskContext,
    matches: fn(&Macro) -> bool,
    kind: &str,
) -> Result<()> {
    for index in 0..program.macros().len() {
        let m = &program.macros()[index];
        if !matches(m) || m.value() == 0.0 {
            continue;
        }
        let name = m.display_name().to_string();
        if program.is_wheel_modulated(index) {
            context.report(
                program,
                format!("Did not zero {} macro '{}', the mod wheel drives it.", kind, name),
            );
            continue;
        }
        program.set_macro_value(index, 0.0);
        context.report(program, format!("Zeroed {} macro '{}'.", kind, name));
    }
    Ok(())
}

/// Moves release and reverb macros that are zeroed or driven by the mod wheel
/// to the end of the layout.
pub(super) fn move_zeroed_macros_to_end(program: &mut Program, context: &TaskContext) -> Result<()> {
    let visible = program.visible_macro_indices();
    let moving: Vec<usize> = visible
        .iter()
        .copied()
        .filter(|&index| {
            let m = &program.macros()[index];
            (m.is_release() || m.is_reverb())
                && (m.value() == 0.0 || program.is_wheel_modulated(index))
        })
        .collect();
    if moving.is_empty() {
        return Ok(());
    }
    let names = display_names(program, &moving);
    let staying: Vec<usize> = visible
        .into_iter()
        .filter(|index| !moving.contains(index))
        .collect();
    // Only visible macros count when deciding whether they are already last.
    if staying.iter().all(|&index| index < moving[0]) {
        return Ok(());
    }
    move_macros_to_end(program, &moving)?;
    context.report(program, format!("Moved {} to the end.", names));
    relayout(program, context)
}

/// Zeroes release and reverb macros, then moves them to the end.
pub(super) fn initialise_values_and_move_macros(program: &mut Program, context: &TaskContext) -> Result<()> {
    zero_release_macro(program, context)?;
    zero_reverb_macros(program, context)?;
    move_zeroed_macros_to_end(program, context)
}

fn display_names(program: &Program, indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&index| format!("'{}'", program.macros()[index].display_name()))
        .collect::<Vec<String>>()
        .join(", ")
}
