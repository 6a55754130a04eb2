//! Decoded-literal preview for hovers and the side panel

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

use crate::escape::{self, StyleMap};
use crate::locator::LocatedLiteral;
use crate::syntax::{LanguageDetector, LanguageId};

/// When and how much to preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    pub enabled: bool,
    /// Decoded lines shown before truncating
    pub max_lines: usize,
    /// Raw literals shorter than this (in chars) get no preview
    pub min_length: usize,
    /// Skip literals that contain no recognised escapes
    pub only_with_escapes: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_lines: 40,
            min_length: 1,
            only_with_escapes: true,
        }
    }
}

/// Rendered preview of one literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverPreview {
    pub title: String,
    pub language: LanguageId,
    /// Decoded text, cut at `max_lines`
    pub text: String,
    pub markdown: String,
    /// Lines left out of `text`
    pub truncated: usize,
}

/// Build the hover preview for a located literal
pub fn hover_markdown(
    located: &LocatedLiteral,
    options: &PreviewOptions,
    detector: &dyn LanguageDetector,
) -> Option<HoverPreview> {
    if !options.enabled || located.content.chars().count() < options.min_length {
        return None;
    }

    let styles = StyleMap::infer(&located.content);
    if options.only_with_escapes && !styles.has_escapes() {
        return None;
    }

    let decoded = escape::decode(&located.content, Some(&styles));
    let language = detector.detect(&decoded).unwrap_or_else(|| {
        tracing::debug!("No language detected for hover preview");
        LanguageId::PlainText
    });

    let lines: Vec<&str> = decoded.split('\n').collect();
    let shown = lines.len().min(options.max_lines.max(1));
    let truncated = lines.len() - shown;
    let text = lines[..shown].join("\n");

    let title = match language {
        LanguageId::PlainText => "Decoded string".to_string(),
        lang => format!("Decoded string ({})", lang.display_name()),
    };

    let fence = "`".repeat(longest_backtick_run(&text).max(2) + 1);
    let mut markdown = format!(
        "**{}**\n\n{}{}\n{}\n{}\n",
        title,
        fence,
        language.fence_tag(),
        text,
        fence
    );
    if truncated > 0 {
        markdown.push_str(&format!("\n_{} more lines not shown_\n", truncated));
    }
    if styles.is_mixed() {
        markdown.push_str("\n_Mixed single- and double-escaped characters_\n");
    }

    Some(HoverPreview {
        title,
        language,
        text,
        markdown,
        truncated,
    })
}

/// Render a preview as an HTML fragment for the side panel
pub fn panel_html(preview: &HoverPreview) -> String {
    let parser = Parser::new_ext(&preview.markdown, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(preview.markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::locate_literal;
    use crate::syntax::NoDetection;

    struct Always(LanguageId);

    impl LanguageDetector for Always {
        fn detect(&self, _text: &str) -> Option<LanguageId> {
            Some(self.0)
        }
    }

    fn located(line: &str) -> LocatedLiteral {
        locate_literal(line, 3).unwrap()
    }

    #[test]
    fn test_hover_decodes_into_fenced_block() {
        let preview = hover_markdown(
            &located(r#"x "{\"a\":\n1}""#),
            &PreviewOptions::default(),
            &Always(LanguageId::Json),
        )
        .unwrap();
        assert_eq!(preview.text, "{\"a\":\n1}");
        assert_eq!(preview.language, LanguageId::Json);
        assert!(preview.markdown.contains("```json\n{\"a\":\n1}\n```"));
        assert_eq!(preview.title, "Decoded string (JSON)");
    }

    #[test]
    fn test_no_preview_without_escapes() {
        let options = PreviewOptions::default();
        assert!(hover_markdown(&located(r#"x "plain""#), &options, &NoDetection).is_none());

        let options = PreviewOptions {
            only_with_escapes: false,
            ..PreviewOptions::default()
        };
        assert!(hover_markdown(&located(r#"x "plain""#), &options, &NoDetection).is_some());
    }

    #[test]
    fn test_disabled_and_short_literals_skipped() {
        let disabled = PreviewOptions {
            enabled: false,
            ..PreviewOptions::default()
        };
        assert!(hover_markdown(&located(r#"x "a\nb""#), &disabled, &NoDetection).is_none());

        let long_only = PreviewOptions {
            min_length: 10,
            ..PreviewOptions::default()
        };
        assert!(hover_markdown(&located(r#"x "a\nb""#), &long_only, &NoDetection).is_none());
    }

    #[test]
    fn test_truncates_long_content() {
        let options = PreviewOptions {
            max_lines: 2,
            ..PreviewOptions::default()
        };
        let preview = hover_markdown(&located(r#"x "1\n2\n3\n4""#), &options, &NoDetection).unwrap();
        assert_eq!(preview.text, "1\n2");
        assert_eq!(preview.truncated, 2);
        assert!(preview.markdown.contains("2 more lines not shown"));
        assert!(preview.markdown.contains("```text\n"));
    }

    #[test]
    fn test_fence_outgrows_backticks_in_content() {
        let preview = hover_markdown(
            &located(r#"x "```\n``""#),
            &PreviewOptions::default(),
            &NoDetection,
        )
        .unwrap();
        assert!(preview.markdown.contains("````text\n```\n``\n````"));
    }

    #[test]
    fn test_panel_html_renders_code_block() {
        let preview = hover_markdown(
            &located(r#"x "a<b\nc""#),
            &PreviewOptions::default(),
            &NoDetection,
        )
        .unwrap();
        let html = panel_html(&preview);
        assert!(html.contains("<strong>Decoded string</strong>"));
        assert!(html.contains("<code class=\"language-text\">a&lt;b\nc\n</code>"));
    }
}
