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
//! Info page geometry: the standard macro grid, location ordering and the
//! structural edits that change the macro order.

use tracing::debug;

use crate::error::{Error, Result};
use crate::program::{Macro, Program, INFO_PAGE_RIGHT_EDGE};

/// The width of a macro knob on the Info page.
pub const MACRO_WIDTH: i32 = 60;
/// Macros whose positions differ by less than this are in the same row or column.
pub const LOCATION_FUDGE: i32 = 30;
/// The most macros the standard layout can hold.
pub const MAX_MACROS: usize = 32;

const INFO_PAGE_BOTTOM: i32 = 480;
const ROW_HEIGHT: i32 = 115;
const CROWDED_ROW_HEIGHT: i32 = ROW_HEIGHT - 10;

/// The standard grid for a number of macros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    per_row: usize,
    rows: usize,
    row_height: i32,
    top: i32,
    gap: i32,
}

impl Grid {
    /// Computes the grid for the given number of visible macros. `top_nudge`
    /// shifts the whole grid vertically.
    pub fn new(count: usize, top_nudge: i32) -> Result<Grid> {
        if count > MAX_MACROS {
            return Err(Error::application(format!(
                "There are {} macros on the Info page, but the standard layout holds at most {}.",
                count, MAX_MACROS
            )));
        }
        let per_row = match count {
            0..=12 => 4,
            13..=15 => 5,
            16..=21 => 7,
            _ => 8,
        };
        let rows = count.div_ceil(per_row);
        let row_height = if rows >= 4 {
            CROWDED_ROW_HEIGHT
        } else {
            ROW_HEIGHT
        };
        let rows_above_bottom = match rows {
            0 | 1 => 1,
            2 | 3 => 2,
            _ => 3,
        };
        let per_row_i32 = per_row as i32;
        Ok(Grid {
            per_row,
            rows,
            row_height,
            top: INFO_PAGE_BOTTOM - rows_above_bottom * row_height + top_nudge,
            gap: (INFO_PAGE_RIGHT_EDGE - MACRO_WIDTH * per_row_i32) / (per_row_i32 + 1),
        })
    }

    pub fn per_row(&self) -> usize {
        self.per_row
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    /// Gets the position of the macro at the given place in the layout.
    pub fn position(&self, index: usize) -> (i32, i32) {
        let row = (index / self.per_row) as i32;
        let column = (index % self.per_row) as i32;
        (
            self.gap + column * (MACRO_WIDTH + self.gap),
            self.top + row * self.row_height,
        )
    }
}

/// Orders the given macros by where they are on the Info page. Rows first
/// reads top to bottom then left to right; otherwise left to right then top
/// to bottom, the way script GUIs lay out their controls.
pub fn location_order(macros: &[Macro], indices: &[usize], rows_first: bool) -> Vec<usize> {
    let key = |index: usize| {
        let m = &macros[index];
        if rows_first {
            (m.y(), m.x())
        } else {
            (m.x(), m.y())
        }
    };

    let mut sorted = indices.to_vec();
    sorted.sort_by_key(|&index| key(index));

    let mut bands: Vec<Vec<usize>> = Vec::new();
    let mut band_start = None;
    for index in sorted {
        let (primary, _) = key(index);
        match (band_start, bands.last_mut()) {
            (Some(start), Some(band)) if primary - start < LOCATION_FUDGE => band.push(index),
            _ => {
                bands.push(vec![index]);
                band_start = Some(primary);
            }
        }
    }

    bands
        .into_iter()
        .flat_map(|mut band| {
            band.sort_by_key(|&index| {
                let (primary, secondary) = key(index);
                (secondary, primary)
            });
            band
        })
        .collect()
}

/// Puts the visible macros into location order, leaving the hidden ones after
/// them. Returns true if the order changed.
pub fn reorder_macros_by_location(program: &mut Program, rows_first: bool) -> Result<bool> {
    let visible = program.visible_macro_indices();
    let mut order = location_order(program.macros(), &visible, rows_first);
    order.extend((0..program.macros().len()).filter(|index| !visible.contains(index)));
    apply_order(program, &order)
}

/// Moves the visible macros into the standard grid, in their current order.
/// Stacked macros stay where they are. Returns true if any macro moved.
pub fn move_macros_to_standard_layout(program: &mut Program, top_nudge: i32) -> Result<bool> {
    let visible = program.visible_macro_indices();
    let grid = Grid::new(visible.len(), top_nudge)?;
    debug!(
        macros = visible.len(),
        per_row = grid.per_row(),
        rows = grid.rows(),
        "Standard layout"
    );
    let mut moved = false;
    for (place, index) in visible.into_iter().enumerate() {
        let (x, y) = grid.position(place);
        moved |= program.set_macro_location(index, x, y);
    }
    Ok(moved)
}

/// Moves the given macros to the end of the order, keeping their relative order.
pub fn move_macros_to_end(program: &mut Program, indices: &[usize]) -> Result<bool> {
    let mut order: Vec<usize> = (0..program.macros().len())
        .filter(|index| !indices.contains(index))
        .collect();
    order.extend(indices.iter().copied());
    apply_order(program, &order)
}

/// Removes the given macros and the modulations they drive.
pub fn remove_macros(program: &mut Program, indices: &[usize]) -> Result<()> {
    let mut indices = indices.to_vec();
    indices.sort_unstable();
    indices.dedup();
    for index in indices.into_iter().rev() {
        program.remove_macro(index);
    }
    program.commit_and_reload()
}

/// Works out where a new Wheel macro belongs in the current macro order.
pub fn wheel_insertion_index(program: &Program) -> usize {
    let macros = program.macros();
    let adsr: Vec<usize> = (0..macros.len()).filter(|&i| macros[i].is_adsr()).collect();
    if adsr.len() == 4 {
        if let Some(attack) = adsr.iter().copied().find(|&i| macros[i].is_attack()) {
            let mut names: Vec<String> = adsr
                .iter()
                .map(|&i| macros[i].display_name().to_lowercase())
                .collect();
            names.sort();
            names.dedup();
            if names.len() == 4 {
                return attack;
            }
        }
    }

    let continuous: Vec<usize> = program
        .visible_macro_indices()
        .into_iter()
        .filter(|&i| macros[i].is_continuous())
        .collect();
    match continuous.last() {
        None => 0,
        Some(&last) if continuous.len() < 4 => last + 1,
        Some(&last) if continuous.len() == 4 => {
            let zeroed_reverb = macros[last].is_reverb() && macros[last].value() == 0.0;
            let has_toggles = macros.iter().any(Macro::is_toggle);
            if zeroed_reverb && !has_toggles {
                last
            } else {
                last + 1
            }
        }
        Some(_) => 4,
    }
}

/// Reorders the macros and rebuilds the program from the saved file.
fn apply_order(program: &mut Program, order: &[usize]) -> Result<bool> {
    if order.iter().copied().eq(0..program.macros().len()) {
        return Ok(false);
    }
    program.reorder_macros(order);
    program.commit_and_reload()?;
    Ok(true)
}
