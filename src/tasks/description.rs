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
use crate::program::Program;

use super::TaskContext;

/// Puts a line naming the program's sound bank and category at the top of its description.
pub(super) fn prepend_path_line(program: &mut Program, context: &TaskContext) -> Result<()> {
    let line = format!("PATH: {}\\{}", program.sound_bank_folder(), program.category());
    let description = program.description();
    if description.starts_with(&line) {
        return Ok(());
    }
    let description = if description.is_empty() {
        line
    } else {
        format!("{}\n{}", line, description)
    };
    program.set_description(&description);
    context.report(program, "Added the path line to the description.");
    Ok(())
}
