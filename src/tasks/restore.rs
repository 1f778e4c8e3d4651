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

use crate::error::{Error, Result};

use super::TaskContext;

/// Copies the original of a program over the working file. The program is not read.
pub(super) fn restore_original(path: &Path, context: &TaskContext) -> Result<()> {
    let folders = context.settings().folders();
    let relative = path.strip_prefix(&folders.programs).map_err(|_| {
        Error::application(format!(
            "{} is not in the programs folder {}.",
            path.display(),
            folders.programs.display()
        ))
    })?;
    let original = folders.original_programs.join(relative);
    if !original.is_file() {
        return Err(Error::application(format!(
            "There is no original of {} at {}. Check folders.original_programs in the settings.",
            path.display(),
            original.display()
        )));
    }

    let original_bytes = fs::read(&original).map_err(|e| Error::io(&original, e))?;
    if path.is_file() && fs::read(path).map_err(|e| Error::io(path, e))? == original_bytes {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, original_bytes).map_err(|e| Error::io(path, e))?;
    context.report_path(path, "Restored the original.");
    Ok(())
}
