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
use crate::xml::{Document, NodeId};

const SOUND_BANK_EXTENSION: &str = ".ufs";

/// Works out which sound bank a program belongs to from what it references.
/// Sound bank folders are named by whoever organized them, so the folder name
/// is only the last resort.
pub(super) fn identify(document: &Document, program: NodeId, folder_name: &str) -> String {
    let original_path = document
        .child_named(program, "Properties")
        .and_then(|properties| document.attribute(properties, "OriginalProgramPath"))
        .and_then(sound_bank_in);
    if let Some(sound_bank) = original_path {
        return sound_bank;
    }

    document
        .descendants(program)
        .into_iter()
        .flat_map(|node| document.attributes(node).iter())
        .find_map(|(_, value)| sound_bank_in(value))
        .unwrap_or_else(|| folder_name.to_string())
}

/// Extracts the sound bank name from a reference such as `$Pulsar.ufs/Samples/x.wav`.
fn sound_bank_in(value: &str) -> Option<String> {
    let end = value.find(SOUND_BANK_EXTENSION)?;
    let start = value[..end].rfind(['$', '/', '\\']).map_or(0, |i| i + 1);
    let name = value[start..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
