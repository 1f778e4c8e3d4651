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
//! A lossless XML tree. Nodes keep the exact source text they were parsed
//! from, and only elements that have been edited are rendered afresh, so a
//! document that has not been touched writes back byte-for-byte.

mod document;
mod error;
mod parse;

pub use document::{Document, NodeId};
pub use error::XmlError;
