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
//! Read-only tasks. They report on programs and never change them.

use crate::error::Result;
use crate::program::{format_number, ConnectionsParent, Program};

use super::ccs::reuse_cc1_target;
use super::TaskContext;

pub(super) fn adsr_macros(program: &Program, context: &TaskContext) -> Result<()> {
    let adsr: Vec<String> = program
        .macros()
        .iter()
        .filter(|m| m.is_adsr())
        .map(|m| format!("{}={}", m.display_name(), format_number(m.value())))
        .collect();
    if !adsr.is_empty() {
        context.report(program, format!("ADSR macros: {}.", adsr.join(", ")));
    }
    Ok(())
}

pub(super) fn dahdsr_modulations(program: &Program, context: &TaskContext) -> Result<()> {
    for dahdsr in program.dahdsrs() {
        for modulation in dahdsr.modulations() {
            context.report(
                program,
                format!(
                    "{} modulated by {} ({} x{}).",
                    dahdsr.label(),
                    modulation.source(),
                    modulation.destination(),
                    format_number(modulation.ratio())
                ),
            );
        }
    }
    Ok(())
}

pub(super) fn delay_types(program: &Program, context: &TaskContext) -> Result<()> {
    effect_types(program, context, true)
}

pub(super) fn reverb_types(program: &Program, context: &TaskContext) -> Result<()> {
    effect_types(program, context, false)
}

fn effect_types(program: &Program, context: &TaskContext, delay: bool) -> Result<()> {
    let types: Vec<String> = program
        .effects()
        .iter()
        .filter(|effect| if delay { effect.is_delay() } else { effect.is_reverb() })
        .map(|effect| {
            let state = if effect.is_bypassed() { ", bypassed" } else { "" };
            format!("{} '{}'{}", effect.effect_type(), effect.name(), state)
        })
        .collect();
    if !types.is_empty() {
        let kind = if delay { "Delay" } else { "Reverb" };
        context.report(program, format!("{} effects: {}.", kind, types.join(", ")));
    }
    Ok(())
}

pub(super) fn count_macros(program: &Program, context: &TaskContext) -> Result<()> {
    context.report(
        program,
        format!(
            "{} macros, {} visible.",
            program.macros().len(),
            program.visible_macro_indices().len()
        ),
    );
    Ok(())
}

pub(super) fn reuse_cc1_not_supported(program: &Program, context: &TaskContext) -> Result<()> {
    if let Err(reason) = reuse_cc1_target(program, context.settings().midi_for_macros()) {
        context.report(program, format!("ReuseCc1 is not supported: {}", reason));
    }
    Ok(())
}
