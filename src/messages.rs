//! Message types for the Elm-style architecture
//!
//! Every event the integration layer reports becomes one of these.

use crate::model::DocumentId;
use crate::scratch::ScratchId;
use crate::session::EditRequest;

/// Top-level message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Pointer rests on a position (0-indexed line, char column)
    Hover {
        document: DocumentId,
        line: usize,
        column: usize,
    },
    /// Edit-literal command invoked
    Edit(EditRequest),
    /// The scratch copy was written to its backing store
    ScratchSaved(ScratchId),
    /// The scratch copy is no longer open anywhere
    ScratchClosed(ScratchId),
}
