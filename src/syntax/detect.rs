//! Content-based language detection for decoded literals
//!
//! Detection only decorates previews, so every failure degrades to "no
//! language". Scoring is two-staged: cheap weighted signals pick candidates,
//! then a tree-sitter parse rejects candidates whose grammar chokes on the
//! text.

use std::cell::RefCell;
use std::collections::HashMap;

use tree_sitter::{Language, Parser, Tree};

use super::languages::LanguageId;

/// Only this many bytes are parsed when confirming a candidate
const MAX_PARSE_BYTES: usize = 16 * 1024;

/// Signal score below which a language is not considered at all
const MIN_SCORE: u32 = 3;

/// Candidates confirmed by parsing, highest score first
const MAX_CANDIDATES: usize = 3;

/// Anything that can guess the language of a piece of text
pub trait LanguageDetector {
    fn detect(&self, text: &str) -> Option<LanguageId>;
}

/// Detector that never detects anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDetection;

impl LanguageDetector for NoDetection {
    fn detect(&self, _text: &str) -> Option<LanguageId> {
        None
    }
}

/// Signal scoring confirmed by tree-sitter grammars
///
/// Parsers are created lazily and cached; tree-sitter parsers are `!Sync`,
/// so the cache lives in a `RefCell` and the detector stays on one thread.
pub struct HeuristicDetector {
    parsers: RefCell<HashMap<LanguageId, Parser>>,
    max_error_ratio: f32,
}

impl HeuristicDetector {
    pub fn new() -> Self {
        Self {
            parsers: RefCell::new(HashMap::new()),
            max_error_ratio: 0.05,
        }
    }

    /// Reject candidates whose parse has more than this share of error nodes
    pub fn with_max_error_ratio(mut self, ratio: f32) -> Self {
        self.max_error_ratio = ratio;
        self
    }

    /// Ranked candidates that passed the signal threshold
    pub fn candidates(text: &str) -> Vec<(LanguageId, u32)> {
        let mut scored: Vec<(LanguageId, u32)> = LanguageId::DETECTABLE
            .into_iter()
            .map(|lang| (lang, signal_score(lang, text)))
            .filter(|(_, score)| *score >= MIN_SCORE)
            .collect();
        // Stable sort keeps DETECTABLE order for ties
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
    }

    /// Share of error or missing nodes in a parse of `text`
    ///
    /// `None` when the language has no grammar or the parse failed.
    pub fn error_ratio(&self, lang: LanguageId, text: &str) -> Option<f32> {
        let tree = self.parse(lang, text)?;
        let (errors, total) = count_error_nodes(&tree);
        Some(errors as f32 / total.max(1) as f32)
    }

    fn parse(&self, lang: LanguageId, text: &str) -> Option<Tree> {
        let grammar = grammar(lang)?;
        let mut parsers = self.parsers.borrow_mut();

        if !parsers.contains_key(&lang) {
            let mut parser = Parser::new();
            if let Err(e) = parser.set_language(&grammar) {
                tracing::debug!("Failed to set language for {:?}: {}", lang, e);
                return None;
            }
            parsers.insert(lang, parser);
        }

        let parser = parsers.get_mut(&lang)?;
        let source = truncate_at_char_boundary(text, MAX_PARSE_BYTES);
        let tree = parser.parse(source, None);
        if tree.is_none() {
            tracing::debug!("Parse failed for {:?}", lang);
        }
        tree
    }
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeuristicDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicDetector")
            .field("cached_parsers", &self.parsers.borrow().len())
            .field("max_error_ratio", &self.max_error_ratio)
            .finish()
    }
}

impl LanguageDetector for HeuristicDetector {
    fn detect(&self, text: &str) -> Option<LanguageId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
        {
            return Some(LanguageId::Json);
        }

        for (lang, score) in Self::candidates(trimmed).into_iter().take(MAX_CANDIDATES) {
            match self.error_ratio(lang, trimmed) {
                Some(ratio) if ratio > self.max_error_ratio => {
                    tracing::trace!(?lang, score, ratio, "candidate rejected by parse");
                }
                Some(ratio) => {
                    tracing::trace!(?lang, score, ratio, "candidate confirmed by parse");
                    return Some(lang);
                }
                None if grammar(lang).is_none() => return Some(lang),
                None => {}
            }
        }

        None
    }
}

fn grammar(lang: LanguageId) -> Option<Language> {
    let grammar = match lang {
        LanguageId::Json => tree_sitter_json::LANGUAGE.into(),
        LanguageId::Yaml => tree_sitter_yaml::language(),
        LanguageId::Toml => tree_sitter_toml_ng::LANGUAGE.into(),
        LanguageId::Html => tree_sitter_html::LANGUAGE.into(),
        LanguageId::Xml => tree_sitter_xml::LANGUAGE_XML.into(),
        LanguageId::Css => tree_sitter_css::LANGUAGE.into(),
        LanguageId::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        LanguageId::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        LanguageId::Python => tree_sitter_python::LANGUAGE.into(),
        LanguageId::Rust => tree_sitter_rust::LANGUAGE.into(),
        LanguageId::Go => tree_sitter_go::LANGUAGE.into(),
        LanguageId::Bash => tree_sitter_bash::LANGUAGE.into(),
        // Signal-only languages
        LanguageId::Sql | LanguageId::Markdown | LanguageId::PlainText => return None,
    };
    Some(grammar)
}

fn count_error_nodes(tree: &Tree) -> (usize, usize) {
    let mut cursor = tree.walk();
    let mut errors = 0;
    let mut total = 0;

    loop {
        let node = cursor.node();
        total += 1;
        if node.is_error() || node.is_missing() {
            errors += 1;
        }

        if cursor.goto_first_child() || cursor.goto_next_sibling() {
            continue;
        }
        loop {
            if !cursor.goto_parent() {
                return (errors, total);
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Weighted substring signals per language
fn signals(lang: LanguageId) -> &'static [(&'static str, u32)] {
    match lang {
        LanguageId::Json => &[("\": ", 1), ("\":", 1), ("{\"", 2), ("[{", 2)],
        LanguageId::Html => &[
            ("<!doctype html", 10),
            ("<html", 6),
            ("<body", 4),
            ("<div", 3),
            ("<span", 3),
            ("<p>", 3),
            ("<a href=", 3),
            ("<br", 2),
            ("class=\"", 2),
        ],
        LanguageId::Xml => &[("<?xml", 10), ("xmlns", 4), ("</", 1), ("/>", 1)],
        LanguageId::Css => &[
            ("@media", 4),
            ("px;", 3),
            ("color:", 2),
            ("margin", 2),
            ("padding", 2),
            ("display:", 2),
            ("font-", 2),
        ],
        LanguageId::JavaScript => &[
            ("function ", 3),
            ("const ", 2),
            ("let ", 2),
            ("=> ", 2),
            ("console.", 3),
            ("require(", 3),
            ("document.", 3),
            ("===", 2),
        ],
        LanguageId::TypeScript => &[
            ("interface ", 3),
            (": string", 3),
            (": number", 3),
            (": boolean", 3),
            ("export type ", 3),
            ("const ", 1),
            ("=> ", 1),
        ],
        LanguageId::Python => &[
            ("def ", 3),
            ("import ", 2),
            ("self.", 3),
            ("elif ", 3),
            ("print(", 2),
            ("__init__", 4),
            ("None", 1),
            ("lambda ", 2),
        ],
        LanguageId::Rust => &[
            ("fn ", 3),
            ("let mut ", 4),
            ("impl ", 3),
            ("pub ", 2),
            ("::", 1),
            ("-> ", 1),
            ("&self", 4),
            ("println!", 4),
            ("Some(", 2),
        ],
        LanguageId::Go => &[
            ("func ", 3),
            ("package ", 3),
            (":= ", 3),
            ("fmt.", 3),
            ("err != nil", 5),
        ],
        LanguageId::Bash => &[
            ("#!/bin/", 10),
            ("#!/usr/bin/env bash", 10),
            ("echo ", 3),
            ("$(", 2),
            ("${", 2),
            ("fi\n", 3),
            ("; then", 3),
            ("export ", 2),
            ("sudo ", 3),
        ],
        LanguageId::Sql => &[
            ("SELECT ", 3),
            (" FROM ", 3),
            (" WHERE ", 2),
            ("INSERT INTO ", 4),
            ("UPDATE ", 2),
            ("CREATE TABLE ", 5),
            (" JOIN ", 2),
        ],
        LanguageId::Markdown => &[("```", 3), ("**", 1), ("](", 2)],
        LanguageId::Yaml | LanguageId::Toml | LanguageId::PlainText => &[],
    }
}

fn signal_score(lang: LanguageId, text: &str) -> u32 {
    let mut score: u32 = match lang {
        LanguageId::Sql => {
            let upper = text.to_uppercase();
            signals(lang)
                .iter()
                .filter(|(needle, _)| upper.contains(needle))
                .map(|(_, weight)| weight)
                .sum()
        }
        LanguageId::Html | LanguageId::Xml => {
            let lower = text.to_lowercase();
            signals(lang)
                .iter()
                .filter(|(needle, _)| lower.contains(needle))
                .map(|(_, weight)| weight)
                .sum()
        }
        _ => signals(lang)
            .iter()
            .filter(|(needle, _)| text.contains(needle))
            .map(|(_, weight)| weight)
            .sum(),
    };

    score += line_score(lang, text);
    score
}

/// Signals that depend on line shape rather than substrings
fn line_score(lang: LanguageId, text: &str) -> u32 {
    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    match lang {
        LanguageId::Yaml => {
            let hits = lines
                .filter(|l| {
                    l.starts_with("- ")
                        || *l == "---"
                        || l.split_once(": ").is_some_and(|(key, _)| is_plain_key(key))
                        || l.strip_suffix(':').is_some_and(is_plain_key)
                })
                .count() as u32;
            // A single `key: value` line is too weak a signal
            if hits >= 2 {
                hits * 2
            } else {
                0
            }
        }
        LanguageId::Toml => lines
            .map(|l| {
                if l.starts_with('[') && l.ends_with(']') && !l.contains(',') {
                    3
                } else if l.split_once(" = ").is_some_and(|(key, _)| is_plain_key(key)) {
                    2
                } else {
                    0
                }
            })
            .sum(),
        LanguageId::Css => lines
            .filter(|l| l.ends_with('{') || (l.contains(": ") && l.ends_with(';')))
            .count() as u32,
        LanguageId::Markdown => lines
            .filter(|l| l.starts_with("# ") || l.starts_with("## ") || l.starts_with("* "))
            .count() as u32
            * 2,
        _ => 0,
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_short_circuit() {
        let detector = HeuristicDetector::new();
        assert_eq!(
            detector.detect("{\"name\": \"lens\", \"tags\": [1, 2]}"),
            Some(LanguageId::Json)
        );
    }

    #[test]
    fn test_empty_text_detects_nothing() {
        assert_eq!(HeuristicDetector::new().detect("   \n"), None);
    }

    #[test]
    fn test_prose_detects_nothing() {
        let detector = HeuristicDetector::new();
        assert_eq!(detector.detect("Hello there, how are you today?"), None);
    }

    #[test]
    fn test_python() {
        let detector = HeuristicDetector::new();
        let source = "def greet(name):\n    print(name)\n    return None\n";
        assert_eq!(detector.detect(source), Some(LanguageId::Python));
    }

    #[test]
    fn test_rust() {
        let detector = HeuristicDetector::new();
        let source = "fn main() {\n    let mut x = 1;\n    println!(\"{}\", x);\n}\n";
        assert_eq!(detector.detect(source), Some(LanguageId::Rust));
    }

    #[test]
    fn test_sql_is_signal_only() {
        let detector = HeuristicDetector::new();
        assert_eq!(
            detector.detect("select id, name from users where id = 1"),
            Some(LanguageId::Sql)
        );
    }

    #[test]
    fn test_yaml_needs_several_lines() {
        assert_eq!(line_score(LanguageId::Yaml, "key: value"), 0);
        assert!(line_score(LanguageId::Yaml, "name: lens\nversion: 1\n") >= MIN_SCORE);
    }

    #[test]
    fn test_candidates_are_ranked() {
        let ranked = HeuristicDetector::candidates("#!/bin/bash\necho \"$(date)\"\n");
        assert_eq!(ranked.first().map(|(lang, _)| *lang), Some(LanguageId::Bash));
    }

    #[test]
    fn test_error_ratio_for_broken_input() {
        let detector = HeuristicDetector::new();
        let clean = detector.error_ratio(LanguageId::Json, "{\"a\": 1}").unwrap();
        assert_eq!(clean, 0.0);
        assert!(detector.error_ratio(LanguageId::Sql, "SELECT 1").is_none());
    }

    #[test]
    fn test_no_detection() {
        assert_eq!(NoDetection.detect("fn main() {}"), None);
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        assert_eq!(truncate_at_char_boundary("héllo", 2), "h");
        assert_eq!(truncate_at_char_boundary("abc", 10), "abc");
    }
}
