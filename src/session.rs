//! Edit-session coordinator
//!
//! Drives one round-trip edit of a string literal:
//!
//! ```text
//! Idle ──begin_edit──▶ Editing ──scratch_saved + commit──▶ Saved
//!   ▲                    │                                  │
//!   └────scratch_closed──┴──────────────────────────────────┘
//! ```
//!
//! A save whose literal can no longer be found also returns to Idle.
//! At most one session is live. Beginning a new edit discards the previous
//! session without applying its pending content. The coordinator never
//! touches documents directly: it reads lines through [`DocumentAccess`]
//! and hands back a [`Replacement`] for the caller to apply.

use crate::error::EditError;
use crate::escape::{self, EscapeStyle, Special, StyleMap};
use crate::locator::{self, LiteralSpan};
use crate::model::{DocumentAccess, DocumentId};
use crate::scratch::{ScratchId, ScratchStore};
use crate::syntax::{LanguageDetector, LanguageId};

/// What the user asked to edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    /// Edit whatever literal encloses a cursor position (0-indexed, chars)
    AtCursor {
        document: DocumentId,
        line: usize,
        column: usize,
    },
    /// Edit a literal the caller already located; `start` is the char offset
    /// of its first content character
    Literal {
        document: DocumentId,
        line: usize,
        start: usize,
        text: String,
    },
}

impl EditRequest {
    pub fn document(&self) -> DocumentId {
        match self {
            EditRequest::AtCursor { document, .. } | EditRequest::Literal { document, .. } => {
                *document
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Scratch copy handed out, nothing written back yet
    Editing,
    /// At least one save was written back to the document
    Saved,
}

/// Context of the live edit
#[derive(Debug, Clone)]
pub struct EditSession {
    pub document: DocumentId,
    pub line: usize,
    /// Last known location of the literal content
    pub span: LiteralSpan,
    /// Literal text as it currently stands in the document
    pub literal: String,
    /// Decoded content handed to the scratch copy
    pub original: String,
    pub styles: StyleMap,
    pub quote: char,
    pub scratch: ScratchId,
    pub language: LanguageId,
    pub state: SessionState,
    anchor: usize,
}

impl EditSession {
    /// Encode `real` and compute where it goes in the current document
    ///
    /// The session itself does not move until the replacement is committed.
    fn replacement(
        &self,
        real: &str,
        doc: &dyn DocumentAccess,
        default_style: EscapeStyle,
    ) -> Result<Replacement, EditError> {
        let span = self.resolve_span(doc)?;
        let text = escape::encode_with(real, &self.styles, fallback_style(self.quote, default_style));

        Ok(Replacement {
            document: self.document,
            line: self.line,
            span,
            text,
        })
    }

    /// Find the literal on its recorded line again
    ///
    /// The same text may repeat on a line, so the occurrence must cover the
    /// recorded offset rather than merely be the first match.
    fn resolve_span(&self, doc: &dyn DocumentAccess) -> Result<LiteralSpan, EditError> {
        let not_resolved = || EditError::SpanNotResolved {
            line: self.line,
            literal: self.literal.clone(),
        };
        let line = doc.line(self.line).ok_or_else(not_resolved)?;
        resolve_occurrence(&line, &self.literal, self.anchor).ok_or_else(not_resolved)
    }
}

/// Pick the occurrence of `literal` on `line` that covers `anchor`
pub fn resolve_occurrence(line: &str, literal: &str, anchor: usize) -> Option<LiteralSpan> {
    let spans = locator::occurrences(line, literal);
    spans
        .iter()
        .find(|span| span.start == anchor)
        .or_else(|| {
            spans
                .iter()
                .find(|span| span.start < anchor && anchor < span.end)
        })
        .copied()
}

/// Instruction to replace a literal's content in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub document: DocumentId,
    pub line: usize,
    pub span: LiteralSpan,
    pub text: String,
}

impl Replacement {
    pub fn apply(&self, doc: &mut dyn DocumentAccess) -> Result<(), EditError> {
        doc.replace_range(self.line, self.span, &self.text)
    }
}

/// Result of starting an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginEdit {
    pub scratch: ScratchId,
    /// Decoded content written to the scratch copy
    pub content: String,
    pub language: LanguageId,
    /// Scratch of the session this edit replaced, already deleted
    pub discarded: Option<ScratchId>,
}

/// Owns the single live edit session
#[derive(Debug)]
pub struct EditCoordinator {
    session: Option<EditSession>,
    default_style: EscapeStyle,
}

impl Default for EditCoordinator {
    fn default() -> Self {
        Self::new(EscapeStyle::Single)
    }
}

impl EditCoordinator {
    /// `default_style` applies to special characters the original literal
    /// never escaped
    pub fn new(default_style: EscapeStyle) -> Self {
        Self {
            session: None,
            default_style,
        }
    }

    pub fn default_style(&self) -> EscapeStyle {
        self.default_style
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start editing a literal: decode it into a new scratch copy
    ///
    /// A failed locate leaves any live session alone. Once the literal is
    /// found, the previous session is discarded and its scratch deleted.
    pub fn begin_edit(
        &mut self,
        request: EditRequest,
        doc: &dyn DocumentAccess,
        store: &mut dyn ScratchStore,
        detector: &dyn LanguageDetector,
    ) -> Result<BeginEdit, EditError> {
        let document = request.document();
        let (line, span, literal, quote) = match request {
            EditRequest::AtCursor {
                line, column, ..
            } => {
                let text = doc
                    .line(line)
                    .ok_or(EditError::LineOutOfRange { line })?;
                let located = locator::locate_literal(&text, column)
                    .ok_or(EditError::NoStringFound { line, column })?;
                (line, located.span, located.content, located.quote)
            }
            EditRequest::Literal {
                line, start, text, ..
            } => {
                let current = doc
                    .line(line)
                    .ok_or(EditError::LineOutOfRange { line })?;
                let span = resolve_occurrence(&current, &text, start).ok_or_else(|| {
                    EditError::SpanNotResolved {
                        line,
                        literal: text.clone(),
                    }
                })?;
                let quote = span
                    .start
                    .checked_sub(1)
                    .and_then(|i| current.chars().nth(i))
                    .filter(|c| locator::QUOTES.contains(c))
                    .unwrap_or('"');
                (line, span, text, quote)
            }
        };

        let discarded = self.discard(store);

        let styles = StyleMap::infer(&literal);
        let content = escape::decode(&literal, Some(&styles)).into_owned();
        let language = detector.detect(&content).unwrap_or_default();
        let scratch = store.create(&content, language)?;

        tracing::info!(
            document = document.0,
            line,
            start = span.start,
            end = span.end,
            %scratch,
            language = language.display_name(),
            "Edit session started"
        );
        tracing::debug!(?styles, "Inferred escape styles");

        self.session = Some(EditSession {
            document,
            line,
            span,
            literal,
            original: content.clone(),
            styles,
            quote,
            scratch,
            language,
            state: SessionState::Editing,
            anchor: span.start,
        });

        Ok(BeginEdit {
            scratch,
            content,
            language,
            discarded,
        })
    }

    /// Encode edited content and compute its replacement
    ///
    /// The session moves to Saved once the caller has applied the result and
    /// handed it to [`commit`](Self::commit). When the literal can no longer
    /// be found the session is cleared and nothing is written.
    pub fn complete_edit(
        &mut self,
        scratch_text: &str,
        doc: &dyn DocumentAccess,
    ) -> Result<Replacement, EditError> {
        let session = self.session.as_ref().ok_or(EditError::NoActiveSession)?;
        match session.replacement(scratch_text, doc, self.default_style) {
            Ok(replacement) => {
                tracing::debug!(
                    line = replacement.line,
                    start = replacement.span.start,
                    end = replacement.span.end,
                    "Replacement ready"
                );
                Ok(replacement)
            }
            Err(e) => {
                if let Some(session) = self.session.take() {
                    tracing::warn!(scratch = %session.scratch, "Edit session cleared: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Record an applied replacement (Editing/Saved → Saved)
    ///
    /// Later saves look for the literal where this replacement put it.
    pub fn commit(&mut self, replacement: &Replacement) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.document != replacement.document || session.line != replacement.line {
            tracing::debug!("Ignoring commit for another literal");
            return;
        }

        let start = replacement.span.start;
        session.span = LiteralSpan::new(start, start + replacement.text.chars().count());
        session.anchor = start;
        session.literal = replacement.text.clone();
        session.state = SessionState::Saved;
        tracing::info!(
            line = replacement.line,
            start,
            end = session.span.end,
            "Edit written back"
        );
    }

    /// The scratch copy was persisted: read it and compute the write-back
    ///
    /// If the literal is gone the session ends here and its scratch is
    /// deleted.
    pub fn scratch_saved(
        &mut self,
        id: ScratchId,
        doc: &dyn DocumentAccess,
        store: &mut dyn ScratchStore,
    ) -> Result<Replacement, EditError> {
        self.check_scratch(id)?;
        let content = store.read(id)?;
        let result = self.complete_edit(&content, doc);
        if result.is_err() && !self.is_active() {
            if let Err(e) = store.delete(id) {
                tracing::warn!("Failed to delete scratch {}: {}", id, e);
            }
        }
        result
    }

    /// The scratch copy was closed: end the session
    ///
    /// A session that was never saved gets one final write-back when its
    /// content changed. The scratch is deleted and the session cleared
    /// whatever happens.
    pub fn scratch_closed(
        &mut self,
        id: ScratchId,
        doc: &dyn DocumentAccess,
        store: &mut dyn ScratchStore,
    ) -> Result<Option<Replacement>, EditError> {
        self.check_scratch(id)?;
        let Some(session) = self.session.take() else {
            return Err(EditError::NoActiveSession);
        };

        let result = match session.state {
            SessionState::Saved => Ok(None),
            SessionState::Editing => store.read(id).map_err(EditError::from).and_then(|content| {
                if content == session.original {
                    tracing::debug!(%id, "Scratch closed unchanged");
                    Ok(None)
                } else {
                    session
                        .replacement(&content, doc, self.default_style)
                        .map(Some)
                }
            }),
        };

        let deleted = store.delete(id);
        tracing::info!(%id, "Edit session closed");

        let replacement = result?;
        deleted?;
        Ok(replacement)
    }

    fn check_scratch(&self, id: ScratchId) -> Result<(), EditError> {
        match &self.session {
            None => Err(EditError::NoActiveSession),
            Some(session) if session.scratch != id => Err(EditError::ForeignScratch(id)),
            Some(_) => Ok(()),
        }
    }

    /// Drop the live session, deleting its scratch
    fn discard(&mut self, store: &mut dyn ScratchStore) -> Option<ScratchId> {
        let session = self.session.take()?;
        if let Err(e) = store.delete(session.scratch) {
            tracing::warn!("Failed to delete discarded scratch {}: {}", session.scratch, e);
        }
        tracing::info!(scratch = %session.scratch, "Discarded previous edit session");
        Some(session.scratch)
    }
}

/// Fallback for characters the original literal never escaped
///
/// A forward slash or a quote that is not the delimiter is legal raw.
fn fallback_style(quote: char, default: EscapeStyle) -> impl Fn(Special) -> EscapeStyle {
    move |special| match special {
        Special::ForwardSlash => EscapeStyle::Absent,
        Special::DoubleQuote | Special::SingleQuote if special.real() != quote => {
            EscapeStyle::Absent
        }
        _ => default,
    }
}
