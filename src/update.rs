//! Update functions for the Elm-style architecture
//!
//! Each message runs to completion against the model; side effects come
//! back as a [`Cmd`].

use std::path::Path;

use crate::commands::Cmd;
use crate::error::EditError;
use crate::locator::locate_literal;
use crate::messages::Msg;
use crate::model::{AppModel, DocumentAccess, DocumentId, DocumentStore};
use crate::preview::hover_markdown;
use crate::scratch::ScratchId;
use crate::session::{EditRequest, Replacement};

/// Main update function - dispatches to sub-handlers
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Hover {
            document,
            line,
            column,
        } => update_hover(model, document, line, column),
        Msg::Edit(request) => update_edit(model, request),
        Msg::ScratchSaved(id) => update_scratch_saved(model, id),
        Msg::ScratchClosed(id) => update_scratch_closed(model, id),
    }
}

fn update_hover(model: &AppModel, document: DocumentId, line: usize, column: usize) -> Option<Cmd> {
    let Some(doc) = model.documents.get(document) else {
        tracing::debug!("Hover on unknown document {:?}", document);
        return None;
    };
    let text = doc.line(line)?;
    let located = locate_literal(&text, column)?;
    hover_markdown(&located, &model.config.hover, model.detector.as_ref()).map(Cmd::ShowHover)
}

fn update_edit(model: &mut AppModel, request: EditRequest) -> Option<Cmd> {
    let AppModel {
        documents,
        coordinator,
        scratch,
        detector,
        ..
    } = model;

    let doc = match documents.require(request.document()) {
        Ok(doc) => doc,
        Err(e) => return Some(report(e)),
    };

    match coordinator.begin_edit(request, doc, scratch.as_mut(), detector.as_ref()) {
        Ok(begun) => {
            let open = Cmd::OpenScratch {
                id: begun.scratch,
                path: scratch.path(begun.scratch).map(Path::to_path_buf),
                language: begun.language,
            };
            match begun.discarded {
                Some(old) => Cmd::batch(vec![
                    Cmd::Info(format!("Discarded previous edit session {}", old)),
                    open,
                ]),
                None => Some(open),
            }
        }
        Err(e) => Some(report(e)),
    }
}

fn update_scratch_saved(model: &mut AppModel, id: ScratchId) -> Option<Cmd> {
    let document = session_document(model, id)?;
    let AppModel {
        documents,
        coordinator,
        scratch,
        ..
    } = model;

    let result = documents
        .require(document)
        .and_then(|doc| coordinator.scratch_saved(id, doc, scratch.as_mut()))
        .and_then(|replacement| {
            let document = apply(documents, &replacement)?;
            coordinator.commit(&replacement);
            Ok(document)
        });

    Some(match result {
        Ok(document) => Cmd::SaveDocument(document),
        Err(e) => report(e),
    })
}

fn update_scratch_closed(model: &mut AppModel, id: ScratchId) -> Option<Cmd> {
    let document = session_document(model, id)?;
    let AppModel {
        documents,
        coordinator,
        scratch,
        ..
    } = model;

    let result = documents
        .require(document)
        .and_then(|doc| coordinator.scratch_closed(id, doc, scratch.as_mut()));

    match result {
        Ok(Some(replacement)) => Some(match apply(documents, &replacement) {
            Ok(document) => Cmd::SaveDocument(document),
            Err(e) => report(e),
        }),
        Ok(None) => None,
        Err(e) => Some(report(e)),
    }
}

/// Document of the live session, if `id` is its scratch
///
/// Events for other scratch resources are not ours to handle.
fn session_document(model: &AppModel, id: ScratchId) -> Option<DocumentId> {
    match model.coordinator.session() {
        Some(session) if session.scratch == id => Some(session.document),
        _ => {
            tracing::debug!(%id, "Ignoring event for scratch outside the edit session");
            None
        }
    }
}

fn apply(documents: &mut DocumentStore, replacement: &Replacement) -> Result<DocumentId, EditError> {
    let doc = documents.require_mut(replacement.document)?;
    replacement.apply(doc)?;
    Ok(replacement.document)
}

/// Turn a failure into the user-facing command for its severity
fn report(error: EditError) -> Cmd {
    match error {
        EditError::NoStringFound { .. } => {
            tracing::debug!("{}", error);
            Cmd::Info(error.to_string())
        }
        ref e if e.is_warning() => {
            tracing::warn!("{}", e);
            Cmd::Warn(e.to_string())
        }
        e => {
            tracing::error!("{}", e);
            Cmd::Error(e.to_string())
        }
    }
}
