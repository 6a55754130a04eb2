//! Error taxonomy for edit sessions and scratch resources

use std::path::PathBuf;

use thiserror::Error;

use crate::model::DocumentId;
use crate::scratch::ScratchId;

/// Failures surfaced by the edit-session coordinator
#[derive(Debug, Error)]
pub enum EditError {
    /// Nothing to edit at the requested position
    #[error("no string found at line {line}, column {column}")]
    NoStringFound { line: usize, column: usize },

    /// The recorded literal is no longer where the session left it
    #[error("could not find the original string on line {line}; it may have been edited")]
    SpanNotResolved { line: usize, literal: String },

    #[error("line {line} is out of range")]
    LineOutOfRange { line: usize },

    #[error("no edit session is active")]
    NoActiveSession,

    #[error("scratch {0} does not belong to the active edit session")]
    ForeignScratch(ScratchId),

    #[error("unknown document {0:?}")]
    UnknownDocument(DocumentId),

    #[error(transparent)]
    Scratch(#[from] ScratchError),
}

impl EditError {
    /// Warnings leave the user's document untouched and need no retry
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            EditError::NoStringFound { .. } | EditError::SpanNotResolved { .. }
        )
    }
}

/// Scratch resource I/O failures, always carrying the failing path
#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("scratch file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown scratch {0}")]
    Unknown(ScratchId),
}

impl ScratchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScratchError::Io {
            path: path.into(),
            source,
        }
    }
}
