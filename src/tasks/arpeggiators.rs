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
use crate::layout::remove_macros;
use crate::program::Program;

use super::{relayout, TaskContext};

/// Removes arpeggiator and sequencer script processors wherever they are,
/// then removes the macros that only controlled them.
pub(super) fn remove_arpeggiators_and_sequencing(program: &mut Program, context: &TaskContext) -> Result<()> {
    let had_targets: Vec<String> = (0..program.macros().len())
        .filter(|&index| !program.macro_targets(index).is_empty())
        .map(|index| program.macros()[index].name().to_string())
        .collect();

    let mut removed_any = false;
    while let Some(index) = program
        .script_processors()
        .iter()
        .position(|script_processor| script_processor.is_arpeggiator_or_sequencer())
    {
        let name = program.script_processors()[index].name().to_string();
        program.remove_script_processor(index);
        context.report(program, format!("Removed script processor '{}'.", name));
        removed_any = true;
    }
    if !removed_any {
        return Ok(());
    }

    let orphans: Vec<usize> = (0..program.macros().len())
        .filter(|&index| {
            had_targets.iter().any(|name| name == program.macros()[index].name())
                && program.macro_targets(index).is_empty()
        })
        .collect();
    if orphans.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = orphans
        .iter()
        .map(|&index| format!("'{}'", program.macros()[index].display_name()))
        .collect();
    remove_macros(program, &orphans)?;
    context.report(
        program,
        format!("Removed macros {}, they no longer control anything.", names.join(", ")),
    );
    relayout(program, context)
}
