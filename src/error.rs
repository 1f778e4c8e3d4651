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
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::xml::XmlError;

/// Errors raised while editing programs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A domain error. The message tells the user how to fix the problem.
    #[error("{0}")]
    Application(String),

    /// The batch run was cancelled before it finished.
    #[error("The batch run was cancelled.")]
    Cancelled,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid batch script: {0}")]
    Script(#[from] quick_xml::DeError),
}

impl Error {
    /// Creates an application error from the given message.
    pub fn application(message: impl Into<String>) -> Error {
        Error::Application(message.into())
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: &Path, source: io::Error) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
