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
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// The mod wheel's MIDI CC number.
pub const MOD_WHEEL_CC: u8 = 1;

/// The highest valid MIDI CC number.
const MAX_CC: u8 = 127;

/// An inclusive range of MIDI CC numbers.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcRange {
    pub start: u8,
    pub end: u8,
}

impl CcRange {
    /// Creates a new range.
    pub fn new(start: u8, end: u8) -> CcRange {
        CcRange { start, end }
    }

    /// Returns true if the CC number falls within the range.
    pub fn contains(&self, cc: u8) -> bool {
        (self.start..=self.end).contains(&cc)
    }

    fn overlaps(&self, other: &CcRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for CcRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The MIDI CC numbers used for macros on the Info page.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct MidiForMacros {
    /// The CC number given to the macro that replaces the mod wheel.
    #[serde(default = "default_mod_wheel_replacement_cc")]
    mod_wheel_replacement_cc: u8,
    /// The ranges, in numbering order, used for continuous (knob) macros.
    continuous_cc_ranges: Vec<CcRange>,
    /// The ranges, in numbering order, used for toggle (switch) macros.
    #[serde(default)]
    toggle_cc_ranges: Vec<CcRange>,
}

fn default_mod_wheel_replacement_cc() -> u8 {
    34
}

impl MidiForMacros {
    /// Creates a new MIDI for macros configuration.
    pub fn new(
        mod_wheel_replacement_cc: u8,
        continuous_cc_ranges: Vec<CcRange>,
        toggle_cc_ranges: Vec<CcRange>,
    ) -> MidiForMacros {
        MidiForMacros {
            mod_wheel_replacement_cc,
            continuous_cc_ranges,
            toggle_cc_ranges,
        }
    }

    /// Gets the CC number for the macro that replaces the mod wheel.
    pub fn mod_wheel_replacement_cc(&self) -> u8 {
        self.mod_wheel_replacement_cc
    }

    /// Gets the continuous CC ranges.
    pub fn continuous_cc_ranges(&self) -> &[CcRange] {
        &self.continuous_cc_ranges
    }

    /// Gets the toggle CC ranges.
    pub fn toggle_cc_ranges(&self) -> &[CcRange] {
        &self.toggle_cc_ranges
    }

    /// Checks that the ranges are well formed and that no CC number is used twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.continuous_cc_ranges.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one continuous CC range is required".into(),
            ));
        }

        let all: Vec<&CcRange> = self
            .continuous_cc_ranges
            .iter()
            .chain(self.toggle_cc_ranges.iter())
            .collect();
        for (i, range) in all.iter().enumerate() {
            if range.start > range.end || range.end > MAX_CC {
                return Err(ConfigError::Invalid(format!(
                    "CC range {} must run upwards and end at or below {}",
                    range, MAX_CC
                )));
            }
            if range.contains(MOD_WHEEL_CC) {
                return Err(ConfigError::Invalid(format!(
                    "CC range {} includes the mod wheel (CC {})",
                    range, MOD_WHEEL_CC
                )));
            }
            if let Some(other) = all[i + 1..].iter().find(|other| range.overlaps(other)) {
                return Err(ConfigError::Invalid(format!(
                    "CC ranges {} and {} overlap",
                    range, other
                )));
            }
        }

        if self.mod_wheel_replacement_cc == MOD_WHEEL_CC || self.mod_wheel_replacement_cc > MAX_CC
        {
            return Err(ConfigError::Invalid(format!(
                "the mod wheel replacement CC must be between 2 and {}, not {}",
                MAX_CC, self.mod_wheel_replacement_cc
            )));
        }
        if let Some(range) = self
            .toggle_cc_ranges
            .iter()
            .find(|range| range.contains(self.mod_wheel_replacement_cc))
        {
            return Err(ConfigError::Invalid(format!(
                "the mod wheel replacement CC {} is inside toggle range {}",
                self.mod_wheel_replacement_cc, range
            )));
        }
        Ok(())
    }
}
