//! Runtime tests with a scripted editor standing in for the user

mod common;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use common::{doc_text, file_model, write_file};
use escape_lens::cli::HoverFormat;
use escape_lens::messages::Msg;
use escape_lens::runtime::{Runtime, ScratchEditor};
use escape_lens::session::EditRequest;

/// Replaces the scratch content, or leaves it alone when `content` is None
struct ScriptedEditor {
    content: Option<String>,
    seen: std::rc::Rc<std::cell::RefCell<Vec<(PathBuf, String)>>>,
}

impl ScratchEditor for ScriptedEditor {
    fn edit(&mut self, path: &Path) -> std::io::Result<()> {
        let before = std::fs::read_to_string(path)?;
        self.seen.borrow_mut().push((path.to_path_buf(), before));
        if let Some(content) = &self.content {
            std::fs::write(path, content)?;
            // Make the save visible even on coarse mtime filesystems
            let file = std::fs::File::options().write(true).open(path)?;
            file.set_modified(SystemTime::now() + Duration::from_secs(2))?;
        }
        Ok(())
    }
}

fn scripted(content: Option<&str>) -> (ScriptedEditor, std::rc::Rc<std::cell::RefCell<Vec<(PathBuf, String)>>>) {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let editor = ScriptedEditor {
        content: content.map(str::to_string),
        seen: seen.clone(),
    };
    (editor, seen)
}

#[test]
fn test_edit_updates_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = write_file(dir.path(), "cfg.yaml", "query: \"SELECT *\\nFROM t\"\n");
    let (model, doc) = file_model(&dir.path().join("scratch"), &doc_path);
    let (editor, seen) = scripted(Some("SELECT id\nFROM t\nWHERE x = 'y'"));

    let mut runtime = Runtime::new(model, Box::new(editor), Vec::new());
    runtime
        .dispatch(Msg::Edit(EditRequest::AtCursor {
            document: doc,
            line: 0,
            column: 10,
        }))
        .unwrap();

    assert!(runtime.errors().is_empty());
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, "SELECT *\nFROM t");
    assert!(!seen[0].0.exists(), "scratch file should be removed");

    let expected = "query: \"SELECT id\\nFROM t\\nWHERE x = 'y'\"\n";
    assert_eq!(doc_text(&runtime.model, doc), expected);
    assert_eq!(std::fs::read_to_string(&doc_path).unwrap(), expected);
    assert!(!runtime.model.coordinator.is_active());
}

#[test]
fn test_edit_without_changes_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let original = "msg = \"a\\tb\"\n";
    let doc_path = write_file(dir.path(), "m.py", original);
    let (model, doc) = file_model(&dir.path().join("scratch"), &doc_path);
    let (editor, seen) = scripted(None);

    let mut runtime = Runtime::new(model, Box::new(editor), Vec::new());
    runtime
        .dispatch(Msg::Edit(EditRequest::AtCursor {
            document: doc,
            line: 0,
            column: 8,
        }))
        .unwrap();

    assert_eq!(seen.borrow()[0].1, "a\tb");
    assert_eq!(std::fs::read_to_string(&doc_path).unwrap(), original);
    assert!(!runtime.model.documents.get(doc).unwrap().is_modified);
}

#[test]
fn test_edit_outside_literal_opens_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = write_file(dir.path(), "n.rs", "let n = 1;\n");
    let (model, doc) = file_model(&dir.path().join("scratch"), &doc_path);
    let (editor, seen) = scripted(Some("unused"));

    let mut runtime = Runtime::new(model, Box::new(editor), Vec::new());
    runtime
        .dispatch(Msg::Edit(EditRequest::AtCursor {
            document: doc,
            line: 0,
            column: 4,
        }))
        .unwrap();

    assert!(seen.borrow().is_empty());
    assert!(runtime.errors().is_empty());
}

#[test]
fn test_hover_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = write_file(dir.path(), "h.js", "x = \"a\\nb\";\n");
    let (model, doc) = file_model(&dir.path().join("scratch"), &doc_path);
    let (editor, _) = scripted(None);

    let mut runtime =
        Runtime::new(model, Box::new(editor), Vec::new()).with_hover_format(HoverFormat::Json);
    runtime
        .dispatch(Msg::Hover {
            document: doc,
            line: 0,
            column: 6,
        })
        .unwrap();

    let out = String::from_utf8(runtime.into_output()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["text"], "a\nb");
    assert_eq!(value["truncated"], 0);
}

#[test]
fn test_hover_html_output() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = write_file(dir.path(), "h.js", "x = \"a\\nb\";\n");
    let (model, doc) = file_model(&dir.path().join("scratch"), &doc_path);
    let (editor, _) = scripted(None);

    let mut runtime =
        Runtime::new(model, Box::new(editor), Vec::new()).with_hover_format(HoverFormat::Html);
    runtime
        .dispatch(Msg::Hover {
            document: doc,
            line: 0,
            column: 6,
        })
        .unwrap();

    let out = String::from_utf8(runtime.into_output()).unwrap();
    assert!(out.contains("<strong>Decoded string</strong>"));
    assert!(out.contains("<pre><code class=\"language-text\">a\nb\n</code></pre>"));
}
