//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use std::path::PathBuf;

use crate::model::DocumentId;
use crate::preview::HoverPreview;
use crate::scratch::ScratchId;
use crate::syntax::LanguageId;

/// Commands returned by update functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Show a decoded preview
    ShowHover(HoverPreview),
    /// Open the scratch copy for editing (`path` is None for in-memory stores)
    OpenScratch {
        id: ScratchId,
        path: Option<PathBuf>,
        language: LanguageId,
    },
    /// Persist a document whose buffer was changed
    SaveDocument(DocumentId),
    /// User-visible warning; nothing was written
    Warn(String),
    /// User-visible error
    Error(String),
    Info(String),
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, collapsing trivial batches
    pub fn batch(mut cmds: Vec<Cmd>) -> Option<Self> {
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collapses() {
        assert_eq!(Cmd::batch(vec![]), None);
        assert_eq!(
            Cmd::batch(vec![Cmd::Info("a".into())]),
            Some(Cmd::Info("a".into()))
        );
    }
}
