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
//! MIDI CC numbering for macros.

use tracing::debug;

use crate::config::{CcRange, MidiForMacros};
use crate::error::{Error, Result};
use crate::layout::location_order;
use crate::program::Program;

/// Hands out CC numbers from the continuous and toggle series. A new
/// allocator is made for every assignment pass, so numbering always starts
/// at the beginning of each series.
pub struct CcAllocator {
    continuous: Series,
    toggle: Option<Series>,
}

struct Series {
    name: &'static str,
    numbers: Vec<u8>,
    next: usize,
}

impl Series {
    fn new(name: &'static str, ranges: &[CcRange], skip: Option<u8>) -> Series {
        Series {
            name,
            numbers: ranges
                .iter()
                .flat_map(|range| range.start..=range.end)
                .filter(|&cc| Some(cc) != skip)
                .collect(),
            next: 0,
        }
    }

    fn next(&mut self) -> Result<u8> {
        let cc = self.numbers.get(self.next).copied().ok_or_else(|| {
            Error::application(format!(
                "There are more {} macros than {} CC numbers. Add CC ranges to midi_for_macros in the settings.",
                self.name, self.name
            ))
        })?;
        self.next += 1;
        Ok(cc)
    }
}

impl CcAllocator {
    /// Creates an allocator. When the program has a Wheel macro, the
    /// continuous series skips the replacement CC that belongs to it.
    /// Toggles share the continuous series when no toggle ranges are configured.
    pub fn new(midi: &MidiForMacros, has_wheel: bool) -> CcAllocator {
        let skip = has_wheel.then(|| midi.mod_wheel_replacement_cc());
        let toggle = if midi.toggle_cc_ranges().is_empty() {
            None
        } else {
            Some(Series::new("toggle", midi.toggle_cc_ranges(), skip))
        };
        CcAllocator {
            continuous: Series::new("continuous", midi.continuous_cc_ranges(), skip),
            toggle,
        }
    }

    /// Gets the next continuous CC number.
    pub fn next_continuous(&mut self) -> Result<u8> {
        self.continuous.next()
    }

    /// Gets the next toggle CC number.
    pub fn next_toggle(&mut self) -> Result<u8> {
        match self.toggle.as_mut() {
            Some(toggle) => toggle.next(),
            None => self.continuous.next(),
        }
    }
}

/// Numbers the visible macros in location order. The Wheel macro always gets
/// the replacement CC and macros already driven by the mod wheel keep it;
/// neither uses up a number. Returns true if anything changed.
pub fn assign_macro_ccs(program: &mut Program, midi: &MidiForMacros) -> Result<bool> {
    let rows_first = program.gui_script_processor().is_none();
    let visible = program.visible_macro_indices();
    let order = location_order(program.macros(), &visible, rows_first);

    let has_wheel = program.macros().iter().any(|m| m.is_wheel());
    let mut allocator = CcAllocator::new(midi, has_wheel);
    let mut changed = false;
    for index in order {
        let target = &program.macros()[index];
        let cc = if target.is_wheel() {
            midi.mod_wheel_replacement_cc()
        } else if target.is_modulated_by_mod_wheel() {
            continue;
        } else if target.is_toggle() {
            allocator.next_toggle()?
        } else {
            allocator.next_continuous()?
        };
        debug!(name = target.display_name(), cc, "Assigning CC");
        changed |= program.set_macro_cc(index, cc);
    }
    Ok(changed)
}
