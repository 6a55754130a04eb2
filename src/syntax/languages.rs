//! Language identification
//!
//! Maps file extensions to language IDs and provides language metadata.

use std::path::Path;

use serde::Serialize;

/// Languages the preview can tag decoded content with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    #[default]
    PlainText,
    Json,
    Yaml,
    Toml,
    Html,
    Xml,
    Css,
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    Bash,
    Sql,
    Markdown,
}

impl LanguageId {
    /// Every language a detector may return
    pub const DETECTABLE: [LanguageId; 14] = [
        LanguageId::Json,
        LanguageId::Yaml,
        LanguageId::Toml,
        LanguageId::Html,
        LanguageId::Xml,
        LanguageId::Css,
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::Python,
        LanguageId::Rust,
        LanguageId::Go,
        LanguageId::Bash,
        LanguageId::Sql,
        LanguageId::Markdown,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" | "jsonc" => LanguageId::Json,
            "yaml" | "yml" => LanguageId::Yaml,
            "toml" => LanguageId::Toml,
            "html" | "htm" => LanguageId::Html,
            "xml" | "svg" => LanguageId::Xml,
            "css" => LanguageId::Css,
            "js" | "mjs" | "cjs" | "jsx" => LanguageId::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => LanguageId::TypeScript,
            "py" | "pyi" => LanguageId::Python,
            "rs" => LanguageId::Rust,
            "go" => LanguageId::Go,
            "sh" | "bash" | "zsh" => LanguageId::Bash,
            "sql" => LanguageId::Sql,
            "md" | "markdown" => LanguageId::Markdown,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "Plain Text",
            LanguageId::Json => "JSON",
            LanguageId::Yaml => "YAML",
            LanguageId::Toml => "TOML",
            LanguageId::Html => "HTML",
            LanguageId::Xml => "XML",
            LanguageId::Css => "CSS",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::TypeScript => "TypeScript",
            LanguageId::Python => "Python",
            LanguageId::Rust => "Rust",
            LanguageId::Go => "Go",
            LanguageId::Bash => "Shell",
            LanguageId::Sql => "SQL",
            LanguageId::Markdown => "Markdown",
        }
    }

    /// Info string for a fenced code block
    pub fn fence_tag(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "text",
            LanguageId::Json => "json",
            LanguageId::Yaml => "yaml",
            LanguageId::Toml => "toml",
            LanguageId::Html => "html",
            LanguageId::Xml => "xml",
            LanguageId::Css => "css",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Python => "python",
            LanguageId::Rust => "rust",
            LanguageId::Go => "go",
            LanguageId::Bash => "bash",
            LanguageId::Sql => "sql",
            LanguageId::Markdown => "markdown",
        }
    }

    /// File extension for scratch files holding this language
    pub fn extension(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "txt",
            LanguageId::Json => "json",
            LanguageId::Yaml => "yaml",
            LanguageId::Toml => "toml",
            LanguageId::Html => "html",
            LanguageId::Xml => "xml",
            LanguageId::Css => "css",
            LanguageId::JavaScript => "js",
            LanguageId::TypeScript => "ts",
            LanguageId::Python => "py",
            LanguageId::Rust => "rs",
            LanguageId::Go => "go",
            LanguageId::Bash => "sh",
            LanguageId::Sql => "sql",
            LanguageId::Markdown => "md",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(LanguageId::from_extension("yaml"), LanguageId::Yaml);
        assert_eq!(LanguageId::from_extension("YML"), LanguageId::Yaml);
        assert_eq!(LanguageId::from_extension("rs"), LanguageId::Rust);
        assert_eq!(LanguageId::from_extension("tsx"), LanguageId::TypeScript);
        assert_eq!(LanguageId::from_extension("unknown"), LanguageId::PlainText);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            LanguageId::from_path(Path::new("/path/to/config.json")),
            LanguageId::Json
        );
        assert_eq!(
            LanguageId::from_path(Path::new("no_extension")),
            LanguageId::PlainText
        );
    }

    #[test]
    fn test_extension_round_trips_through_from_extension() {
        for lang in LanguageId::DETECTABLE {
            assert_eq!(LanguageId::from_extension(lang.extension()), lang);
        }
    }
}
