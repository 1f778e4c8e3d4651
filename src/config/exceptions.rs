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
use serde::{Deserialize, Serialize};

/// A sound bank, or one category within it, that a rule does not apply to.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Exception {
    /// The sound bank folder name.
    pub sound_bank: String,
    /// The category folder name. If omitted, the whole sound bank is excepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Exception {
    /// Creates an exception covering a whole sound bank.
    pub fn sound_bank(sound_bank: &str) -> Exception {
        Exception {
            sound_bank: sound_bank.to_string(),
            category: None,
        }
    }

    /// Creates an exception covering one category.
    pub fn category(sound_bank: &str, category: &str) -> Exception {
        Exception {
            sound_bank: sound_bank.to_string(),
            category: Some(category.to_string()),
        }
    }

    fn matches(&self, sound_bank: &str, category: Option<&str>) -> bool {
        if !self.sound_bank.eq_ignore_ascii_case(sound_bank) {
            return false;
        }
        match (&self.category, category) {
            (None, _) => true,
            (Some(own), Some(category)) => own.eq_ignore_ascii_case(category),
            (Some(_), None) => false,
        }
    }
}

/// Per sound bank and category exception lists.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Exceptions {
    /// Categories whose Info page must stay defined by a GUI script processor.
    #[serde(default)]
    pub must_use_gui_script_processor: Vec<Exception>,
    /// Categories whose mod wheel must not be replaced by a macro.
    #[serde(default)]
    pub do_not_replace_mod_wheel: Vec<Exception>,
    /// Categories whose reverb must not be zeroed.
    #[serde(default)]
    pub do_not_zero_reverb: Vec<Exception>,
}

impl Exceptions {
    /// Returns true if the category (or its whole sound bank) must use a GUI script processor.
    pub fn must_use_gui_script_processor(&self, sound_bank: &str, category: &str) -> bool {
        any_match(&self.must_use_gui_script_processor, sound_bank, Some(category))
    }

    /// Returns true if the category (or its whole sound bank) must keep its mod wheel.
    pub fn do_not_replace_mod_wheel(&self, sound_bank: &str, category: &str) -> bool {
        any_match(&self.do_not_replace_mod_wheel, sound_bank, Some(category))
    }

    /// Returns true if the category (or its whole sound bank) must keep its reverb.
    pub fn do_not_zero_reverb(&self, sound_bank: &str, category: &str) -> bool {
        any_match(&self.do_not_zero_reverb, sound_bank, Some(category))
    }

    /// The sound-bank-wide form of [`Exceptions::must_use_gui_script_processor`].
    pub fn sound_bank_must_use_gui_script_processor(&self, sound_bank: &str) -> bool {
        any_match(&self.must_use_gui_script_processor, sound_bank, None)
    }

    /// The sound-bank-wide form of [`Exceptions::do_not_replace_mod_wheel`].
    pub fn sound_bank_does_not_replace_mod_wheel(&self, sound_bank: &str) -> bool {
        any_match(&self.do_not_replace_mod_wheel, sound_bank, None)
    }

    /// The sound-bank-wide form of [`Exceptions::do_not_zero_reverb`].
    pub fn sound_bank_does_not_zero_reverb(&self, sound_bank: &str) -> bool {
        any_match(&self.do_not_zero_reverb, sound_bank, None)
    }
}

fn any_match(exceptions: &[Exception], sound_bank: &str, category: Option<&str>) -> bool {
    exceptions
        .iter()
        .any(|exception| exception.matches(sound_bank, category))
}
