//! Typed errors shared by the edit log, the registry and the storage layer.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which history stack an undo/redo request ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Undo,
    Redo,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stack::Undo => f.write_str("undo"),
            Stack::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Error, Debug)]
pub enum NoteError {
    /// Undo or redo with nothing on the stack. Callers gate on
    /// `HistoryState`, so this should never reach a user.
    #[error("Nothing to {stack}")]
    EmptyStack { stack: Stack },

    #[error("Note '{name}' not found")]
    NotFound { name: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The name mapping could not be encoded for saving.
    #[error("Could not encode note names for '{path}': {details}")]
    Metadata { path: PathBuf, details: String },

    #[error("{0}")]
    Usage(String),
}

impl NoteError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NoteError::Io { path: path.into(), source }
    }

    pub fn not_found(name: &str) -> Self {
        NoteError::NotFound { name: name.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;
