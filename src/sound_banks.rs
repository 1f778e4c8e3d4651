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
//! Sound banks that need handling of their own. These are matched against the
//! sound bank identified from a program's contents.

/// Vertical shifts of the standard layout for banks whose default Info page
/// background has its macro panel off centre.
const TOP_NUDGES: [(&str, i32); 2] = [("Fluidity", -35), ("Eternal Funk", 20)];

/// Macros that go to the end of the layout, in this order.
const END_MACROS: [(&str, &[&str]); 2] = [
    ("Spectre", &["Delay", "Reverb"]),
    ("Ether Fields", &["Chorus", "Delay", "Reverb"]),
];

/// Banks whose programs stop working without their GUI script processor.
const GUI_REQUIRED: [&str; 1] = ["Voklm"];

/// The bank whose layers get macro gain control and replacement scripts.
pub const ORGANIC_PADS: &str = "Organic Pads";

/// Gets the vertical shift of the standard layout for a sound bank.
pub fn top_nudge(sound_bank: &str, uses_default_background: bool) -> i32 {
    if !uses_default_background {
        return 0;
    }
    TOP_NUDGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sound_bank))
        .map_or(0, |(_, nudge)| *nudge)
}

/// Gets the display names of macros that belong at the end of the layout.
pub fn end_macros(sound_bank: &str) -> &'static [&'static str] {
    END_MACROS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sound_bank))
        .map(|(_, macros)| *macros)
        .unwrap_or_default()
}

/// Returns true if the sound bank's GUI script processor cannot be removed.
pub fn requires_gui_script_processor(sound_bank: &str) -> bool {
    GUI_REQUIRED
        .iter()
        .any(|name| name.eq_ignore_ascii_case(sound_bank))
}

/// Returns true for Organic Pads.
pub fn is_organic_pads(sound_bank: &str) -> bool {
    ORGANIC_PADS.eq_ignore_ascii_case(sound_bank)
}
