//! Single-line string literal locator
//!
//! A quote/backslash scanner, not a tokenizer: it knows nothing about
//! multi-line strings, raw strings, or template literal nesting. Offsets are
//! char offsets into the line.

use serde::Serialize;

/// Characters that open and close a literal
pub const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Half-open char range `[start, end)` of a literal's content on one line
///
/// Never includes the quote characters themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LiteralSpan {
    pub start: usize,
    pub end: usize,
}

impl LiteralSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `offset` lies inside the span or on its end boundary
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// A literal found on a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedLiteral {
    pub span: LiteralSpan,
    /// Raw content between the quotes, escapes included
    pub content: String,
    pub quote: char,
    /// False when the line ended before the closing quote
    pub terminated: bool,
}

/// Find the literal enclosing `offset` on `line`
///
/// An offset matches when it falls after the opening quote and at or before
/// the closing quote, so a cursor sitting between `""` finds the empty
/// literal. An unterminated literal extends to the end of the line.
pub fn locate_literal(line: &str, offset: usize) -> Option<LocatedLiteral> {
    let chars: Vec<char> = line.trim_end_matches(['\n', '\r']).chars().collect();

    let mut open: Option<(usize, char)> = None;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }

        match open {
            None if QUOTES.contains(&ch) => open = Some((i, ch)),
            Some((start, quote)) if ch == quote => {
                if start < offset && offset <= i {
                    return Some(located(&chars, start, i, quote, true));
                }
                open = None;
            }
            _ => {}
        }
    }

    match open {
        Some((start, quote)) if offset > start => {
            tracing::trace!(start, "offset inside unterminated literal");
            Some(located(&chars, start, chars.len(), quote, false))
        }
        _ => None,
    }
}

fn located(chars: &[char], open: usize, close: usize, quote: char, terminated: bool) -> LocatedLiteral {
    let span = LiteralSpan::new(open + 1, close);
    LocatedLiteral {
        span,
        content: chars[span.start..span.end].iter().collect(),
        quote,
        terminated,
    }
}

/// Find every occurrence of `needle` on `line` as char spans
pub fn occurrences(line: &str, needle: &str) -> Vec<LiteralSpan> {
    let needle_len = needle.chars().count();
    line.match_indices(needle)
        .map(|(byte_idx, _)| {
            let start = line[..byte_idx].chars().count();
            LiteralSpan::new(start, start + needle_len)
        })
        .collect()
}

/// Convert a char offset into a byte offset, clamped to the line length
pub fn char_to_byte(line: &str, char_offset: usize) -> usize {
    line.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}
