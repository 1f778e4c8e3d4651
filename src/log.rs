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
use parking_lot::Mutex;
use tracing::info;

/// Receives the human-readable lines a batch run produces. How the lines are
/// shown or stored is up to the implementation.
pub trait Log: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Forwards each line to tracing.
#[derive(Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn write_line(&self, line: &str) {
        info!(target: "uvprog::batch", "{}", line);
    }
}

/// Keeps every line in memory.
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> MemoryLog {
        MemoryLog::default()
    }

    /// Gets a copy of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Returns true if any line contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(text))
    }
}

impl Log for MemoryLog {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
