//! Document model - the text buffer and file state of a source document

use ropey::Rope;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EditError;
use crate::locator::LiteralSpan;
use crate::syntax::LanguageId;

/// Unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// What the edit-session coordinator needs from a source document
///
/// The coordinator never opens, saves, or closes documents; it reads lines
/// and asks for single-line replacements.
pub trait DocumentAccess {
    /// Line content without its line ending
    fn line(&self, line_idx: usize) -> Option<Cow<'_, str>>;

    /// Full document content
    fn text(&self) -> String;

    /// Replace the char range `span` on `line_idx` with `new_text`
    fn replace_range(
        &mut self,
        line_idx: usize,
        span: LiteralSpan,
        new_text: &str,
    ) -> Result<(), EditError>;
}

/// Document state - the text buffer and associated file metadata
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier (set when added to a DocumentStore)
    pub id: Option<DocumentId>,
    /// The text buffer
    pub buffer: Rope,
    /// Path to the file on disk (None for in-memory documents)
    pub file_path: Option<PathBuf>,
    /// Whether the buffer has unsaved changes
    pub is_modified: bool,
    /// Language of the source document, from its extension
    pub language: LanguageId,
    /// Document revision counter (incremented on each edit)
    pub revision: u64,
}

impl Document {
    /// Create a document with initial text
    pub fn with_text(text: &str) -> Self {
        Self {
            id: None,
            buffer: Rope::from(text),
            file_path: None,
            is_modified: false,
            language: LanguageId::PlainText,
            revision: 0,
        }
    }

    /// Load a document from a file path
    pub fn from_file(path: PathBuf) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(&path)?;
        let language = LanguageId::from_path(&path);
        Ok(Self {
            id: None,
            buffer: Rope::from(content),
            file_path: Some(path),
            is_modified: false,
            language,
            revision: 0,
        })
    }

    /// Write the buffer back to its file
    pub fn save(&mut self) -> Result<(), std::io::Error> {
        let Some(path) = self.file_path.as_deref() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "document has no file path",
            ));
        };
        write_rope(path, &self.buffer)?;
        self.is_modified = false;
        tracing::info!("Saved {}", path.display());
        Ok(())
    }

    /// Get the display name for this document
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Get the number of lines in the document
    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    /// Get line content as Cow<str>, avoiding allocation when possible
    ///
    /// Returns Cow::Borrowed if the line is stored contiguously in a single chunk,
    /// otherwise returns Cow::Owned with the line as a String.
    /// Also trims the trailing newline.
    pub fn get_line_cow(&self, line_idx: usize) -> Option<Cow<'_, str>> {
        if line_idx >= self.buffer.len_lines() {
            return None;
        }

        let line = self.buffer.line(line_idx);
        let len = line.len_chars();

        let trim_len = if len > 0 && line.char(len - 1) == '\n' {
            if len > 1 && line.char(len - 2) == '\r' {
                2 // CRLF
            } else {
                1 // LF
            }
        } else {
            0
        };

        let trimmed = line.slice(..len - trim_len);
        match trimmed.as_str() {
            Some(s) => Some(Cow::Borrowed(s)),
            None => Some(Cow::Owned(trimmed.to_string())),
        }
    }

    /// Get the length of a line in chars (excluding the line ending)
    pub fn line_length(&self, line_idx: usize) -> usize {
        self.get_line_cow(line_idx)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    /// Convert a (line, column) position to a buffer offset
    pub fn cursor_to_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.buffer.len_lines() {
            return self.buffer.len_chars();
        }
        let line_start = self.buffer.line_to_char(line);
        line_start + column.min(self.line_length(line))
    }

    fn mark_edited(&mut self) {
        self.is_modified = true;
        self.revision = self.revision.wrapping_add(1);
    }
}

impl DocumentAccess for Document {
    fn line(&self, line_idx: usize) -> Option<Cow<'_, str>> {
        self.get_line_cow(line_idx)
    }

    fn text(&self) -> String {
        self.buffer.to_string()
    }

    fn replace_range(
        &mut self,
        line_idx: usize,
        span: LiteralSpan,
        new_text: &str,
    ) -> Result<(), EditError> {
        let line_len = match self.get_line_cow(line_idx) {
            Some(line) => line.chars().count(),
            None => return Err(EditError::LineOutOfRange { line: line_idx }),
        };
        if span.end > line_len {
            return Err(EditError::LineOutOfRange { line: line_idx });
        }

        let start = self.cursor_to_offset(line_idx, span.start);
        let end = self.cursor_to_offset(line_idx, span.end);
        self.buffer.remove(start..end);
        self.buffer.insert(start, new_text);
        self.mark_edited();

        tracing::debug!(
            line = line_idx,
            start = span.start,
            end = span.end,
            inserted = new_text.chars().count(),
            "Replaced range"
        );
        Ok(())
    }
}

fn write_rope(path: &Path, rope: &Rope) -> Result<(), std::io::Error> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    rope.write_to(&mut writer)?;
    writer.flush()
}
