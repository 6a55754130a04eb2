//! Command-line argument parsing
//!
//! Supports:
//! - Inspecting the escape styles of a literal
//! - Decoding and encoding literal text
//! - Previewing or editing the literal at a file position

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::escape::EscapeStyle;

/// Preview and round-trip edit escaped string literals
#[derive(Parser, Debug)]
#[command(name = "escape-lens", version, about = "Preview and edit escaped string literals")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Show the per-character escape styles of a literal and its decoded text
    Inspect {
        /// Literal content as written between the quotes
        literal: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Decode a literal into real text
    Decode {
        literal: String,
        /// Treat every `\x` as single-escaped instead of inferring styles
        #[arg(long)]
        global: bool,
    },
    /// Encode real text into literal form
    Encode {
        text: String,
        /// Reuse the escape styles of this original literal
        #[arg(long, value_name = "LITERAL")]
        like: Option<String>,
        /// Style for characters the original never escaped (absent, single, double)
        #[arg(long, value_name = "STYLE", value_parser = parse_style)]
        default_style: Option<EscapeStyle>,
    },
    /// Preview the literal at a position in a file
    Hover {
        #[command(flatten)]
        target: Target,
        /// Print the preview as an HTML fragment
        #[arg(long, conflicts_with = "json")]
        html: bool,
        #[arg(long)]
        json: bool,
    },
    /// Edit the literal at a position in a file with an external editor
    Edit {
        #[command(flatten)]
        target: Target,
    },
}

/// A file position, 1-indexed as users count
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Source file
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Line N (1-indexed)
    #[arg(long, value_name = "N")]
    pub line: usize,

    /// Column N (1-indexed, in characters)
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub column: usize,
}

/// How a hover preview is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverFormat {
    Markdown,
    Html,
    Json,
}

/// Validated action with 0-indexed positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Inspect {
        literal: String,
        json: bool,
    },
    Decode {
        literal: String,
        global: bool,
    },
    Encode {
        text: String,
        like: Option<String>,
        default_style: Option<EscapeStyle>,
    },
    Hover {
        path: PathBuf,
        line: usize,
        column: usize,
        format: HoverFormat,
    },
    Edit {
        path: PathBuf,
        line: usize,
        column: usize,
    },
}

impl CliArgs {
    /// Convert parsed CLI args into an action
    pub fn into_action(self) -> Result<Action, String> {
        Ok(match self.command {
            CliCommand::Inspect { literal, json } => Action::Inspect { literal, json },
            CliCommand::Decode { literal, global } => Action::Decode { literal, global },
            CliCommand::Encode {
                text,
                like,
                default_style,
            } => Action::Encode {
                text,
                like,
                default_style,
            },
            CliCommand::Hover { target, html, json } => {
                let (line, column) = target.position()?;
                let format = if json {
                    HoverFormat::Json
                } else if html {
                    HoverFormat::Html
                } else {
                    HoverFormat::Markdown
                };
                Action::Hover {
                    path: target.path,
                    line,
                    column,
                    format,
                }
            }
            CliCommand::Edit { target } => {
                let (line, column) = target.position()?;
                Action::Edit {
                    path: target.path,
                    line,
                    column,
                }
            }
        })
    }
}

impl Target {
    /// Convert from 1-indexed (user input) to 0-indexed (internal)
    pub fn position(&self) -> Result<(usize, usize), String> {
        if self.line == 0 || self.column == 0 {
            return Err("Line and column are 1-indexed".to_string());
        }
        Ok((self.line - 1, self.column - 1))
    }
}

fn parse_style(s: &str) -> Result<EscapeStyle, String> {
    match s.to_ascii_lowercase().as_str() {
        "absent" | "raw" => Ok(EscapeStyle::Absent),
        "single" => Ok(EscapeStyle::Single),
        "double" => Ok(EscapeStyle::Double),
        other => Err(format!(
            "unknown style '{}' (expected absent, single or double)",
            other
        )),
    }
}
