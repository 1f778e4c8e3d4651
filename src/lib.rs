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
//! Batch editing of sample-based synthesizer programs: a lossless program
//! model, a catalog of standardizing edits and a batch runner to apply them
//! across a folder tree of programs.

pub mod batch;
pub mod category;
pub mod cc;
pub mod config;
pub mod error;
pub mod layout;
pub mod log;
pub mod program;
pub mod sound_banks;
pub mod tasks;
#[cfg(test)]
mod testutil;
pub mod util;
pub mod xml;

pub use error::{Error, Result};
