//! Command-line runtime: runs actions and executes the commands `update` returns

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;

use crate::cli::{Action, HoverFormat};
use crate::commands::Cmd;
use crate::config::LensConfig;
use crate::escape::{self, StyleMap};
use crate::messages::Msg;
use crate::model::{AppModel, DocumentId};
use crate::preview::{panel_html, HoverPreview};
use crate::scratch::ScratchId;
use crate::session::EditRequest;
use crate::syntax::{HeuristicDetector, LanguageDetector, LanguageId};
use crate::update::update;

/// Opens a scratch file for the user and returns once they are done with it
pub trait ScratchEditor {
    fn edit(&mut self, path: &Path) -> std::io::Result<()>;
}

/// Runs an external editor command and waits for it to exit
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ScratchEditor for ExternalEditor {
    fn edit(&mut self, path: &Path) -> std::io::Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty editor command")
        })?;

        tracing::debug!("Launching {} on {}", self.command, path.display());
        let status = Command::new(program).args(parts).arg(path).status()?;
        if !status.success() {
            tracing::warn!("Editor exited with {}", status);
        }
        Ok(())
    }
}

/// Executes commands against a model, writing user-facing output to `out`
pub struct Runtime<W: Write> {
    pub model: AppModel,
    editor: Box<dyn ScratchEditor>,
    out: W,
    hover_format: HoverFormat,
    errors: Vec<String>,
}

impl<W: Write> Runtime<W> {
    pub fn new(model: AppModel, editor: Box<dyn ScratchEditor>, out: W) -> Self {
        Self {
            model,
            editor,
            out,
            hover_format: HoverFormat::Markdown,
            errors: Vec::new(),
        }
    }

    pub fn with_hover_format(mut self, format: HoverFormat) -> Self {
        self.hover_format = format;
        self
    }

    /// Errors reported so far
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run a message through `update` and execute what comes back
    pub fn dispatch(&mut self, msg: Msg) -> Result<()> {
        tracing::debug!(?msg, "Dispatch");
        match update(&mut self.model, msg) {
            Some(cmd) => self.execute(cmd),
            None => Ok(()),
        }
    }

    fn execute(&mut self, cmd: Cmd) -> Result<()> {
        match cmd {
            Cmd::ShowHover(preview) => self.show_hover(&preview)?,
            Cmd::OpenScratch { id, path, language } => self.open_scratch(id, path, language)?,
            Cmd::SaveDocument(id) => self.save_document(id)?,
            Cmd::Info(msg) => eprintln!("{}", msg),
            Cmd::Warn(msg) => eprintln!("warning: {}", msg),
            Cmd::Error(msg) => {
                eprintln!("error: {}", msg);
                self.errors.push(msg);
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd)?;
                }
            }
        }
        Ok(())
    }

    fn show_hover(&mut self, preview: &HoverPreview) -> Result<()> {
        match self.hover_format {
            HoverFormat::Markdown => write!(self.out, "{}", preview.markdown)?,
            HoverFormat::Html => write!(self.out, "{}", panel_html(preview))?,
            HoverFormat::Json => writeln!(self.out, "{}", serde_json::to_string_pretty(preview)?)?,
        }
        Ok(())
    }

    /// Hand the scratch to the editor, then report what happened to it
    fn open_scratch(&mut self, id: ScratchId, path: Option<PathBuf>, language: LanguageId) -> Result<()> {
        let path = path.ok_or_else(|| anyhow!("scratch {} has no file to open", id))?;
        tracing::info!("Editing scratch {} ({}) at {}", id, language.display_name(), path.display());

        let before = modified_time(&path);
        let edited = self.editor.edit(&path);
        if modified_time(&path) != before {
            self.dispatch(Msg::ScratchSaved(id))?;
        }
        self.dispatch(Msg::ScratchClosed(id))?;

        edited.with_context(|| format!("failed to run editor on {}", path.display()))
    }

    fn save_document(&mut self, id: DocumentId) -> Result<()> {
        let doc = self
            .model
            .documents
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown document {:?}", id))?;
        if doc.file_path.is_none() {
            tracing::debug!("Document {:?} has no file, keeping edit in memory", id);
            return Ok(());
        }
        doc.save()
            .with_context(|| format!("failed to save {}", doc.display_name()))?;
        eprintln!("Updated {}", doc.display_name());
        Ok(())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[derive(Serialize)]
struct Inspection<'a> {
    literal: &'a str,
    styles: StyleMap,
    mixed: bool,
    decoded: &'a str,
    language: Option<LanguageId>,
}

/// Run one CLI action
pub fn run(action: Action, config: LensConfig, out: &mut impl Write) -> Result<()> {
    match action {
        Action::Inspect { literal, json } => {
            let styles = StyleMap::infer(&literal);
            let decoded = escape::decode(&literal, Some(&styles));
            let language = config
                .detect_language
                .then(|| HeuristicDetector::new().detect(&decoded))
                .flatten();
            let inspection = Inspection {
                literal: &literal,
                styles,
                mixed: styles.is_mixed(),
                decoded: &decoded,
                language,
            };
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&inspection)?)?;
            } else {
                write_inspection(out, &inspection)?;
            }
        }
        Action::Decode { literal, global } => {
            let decoded = if global {
                escape::decode_global(&literal)
            } else {
                escape::decode(&literal, Some(&StyleMap::infer(&literal)))
            };
            writeln!(out, "{}", decoded)?;
        }
        Action::Encode {
            text,
            like,
            default_style,
        } => {
            let styles = like.as_deref().map(StyleMap::infer).unwrap_or_default();
            let default = default_style.unwrap_or(config.default_style);
            writeln!(out, "{}", escape::encode(&text, &styles, default))?;
        }
        Action::Hover {
            path,
            line,
            column,
            format,
        } => {
            let (runtime, document) = file_runtime(config, &path, out)?;
            let mut runtime = runtime.with_hover_format(format);
            runtime.dispatch(Msg::Hover {
                document,
                line,
                column,
            })?;
        }
        Action::Edit { path, line, column } => {
            let (mut runtime, document) = file_runtime(config, &path, out)?;
            runtime.dispatch(Msg::Edit(EditRequest::AtCursor {
                document,
                line,
                column,
            }))?;
            if let Some(last) = runtime.errors().last() {
                bail!("{}", last);
            }
        }
    }
    Ok(())
}

fn file_runtime<'w, W: Write>(
    config: LensConfig,
    path: &Path,
    out: &'w mut W,
) -> Result<(Runtime<&'w mut W>, DocumentId)> {
    let editor = ExternalEditor::new(config.editor_command());
    let mut model = AppModel::new(config)?;
    let document = model
        .documents
        .open(path.to_path_buf())
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok((Runtime::new(model, Box::new(editor), out), document))
}

fn write_inspection(out: &mut impl Write, inspection: &Inspection<'_>) -> Result<()> {
    let escaped: Vec<_> = inspection
        .styles
        .iter()
        .filter(|(_, style)| *style != escape::EscapeStyle::Absent)
        .collect();

    if escaped.is_empty() {
        writeln!(out, "no escapes")?;
    }
    for (special, style) in escaped {
        writeln!(out, "{:<16}{}", special.display_name(), style)?;
    }
    if inspection.mixed {
        writeln!(out, "(mixed styles)")?;
    }
    if let Some(language) = inspection.language {
        writeln!(out, "language        {}", language.display_name())?;
    }
    writeln!(out, "---")?;
    writeln!(out, "{}", inspection.decoded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(action: Action) -> String {
        let mut out = Vec::new();
        run(action, LensConfig::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_decode_action() {
        let out = run_to_string(Action::Decode {
            literal: "a\\nb".to_string(),
            global: false,
        });
        assert_eq!(out, "a\nb\n");
    }

    #[test]
    fn test_encode_action_reuses_styles() {
        let out = run_to_string(Action::Encode {
            text: "x\\ty\nz".to_string(),
            like: Some("a\\\\tb".to_string()),
            default_style: None,
        });
        assert_eq!(out, "x\\\\ty\\nz\n");
    }

    #[test]
    fn test_encode_action_default_style() {
        let out = run_to_string(Action::Encode {
            text: "x\ty".to_string(),
            like: None,
            default_style: Some(escape::EscapeStyle::Double),
        });
        assert_eq!(out, "x\\\\ty\n");
    }

    #[test]
    fn test_inspect_text_lists_escaped_characters() {
        let out = run_to_string(Action::Inspect {
            literal: "a\\nb\\\\tc".to_string(),
            json: false,
        });
        assert!(out.contains("newline         single"));
        assert!(out.contains("tab             double"));
        assert!(out.contains("(mixed styles)"));
        assert!(out.ends_with("---\na\nb\\tc\n"));
    }

    #[test]
    fn test_inspect_json() {
        let out = run_to_string(Action::Inspect {
            literal: "a\\tb".to_string(),
            json: true,
        });
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["styles"]["tab"], "single");
        assert_eq!(value["decoded"], "a\tb");
    }
}
