//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use escape_lens::config::{LensConfig, ScratchConfig};
use escape_lens::model::{AppModel, Document, DocumentId};
use escape_lens::scratch::{MemoryScratchStore, ScratchStore};
use escape_lens::syntax::NoDetection;

/// Model with in-memory scratch resources and one in-memory document
pub fn memory_model(text: &str) -> (AppModel, DocumentId) {
    let mut model = AppModel::with_parts(
        LensConfig::default(),
        Box::new(MemoryScratchStore::new()),
        Box::new(NoDetection),
    );
    let id = model.documents.insert(Document::with_text(text));
    (model, id)
}

/// Model with scratch files in `scratch_dir` and one document loaded from disk
pub fn file_model(scratch_dir: &Path, doc_path: &Path) -> (AppModel, DocumentId) {
    let config = LensConfig {
        scratch: ScratchConfig {
            directory: Some(scratch_dir.to_path_buf()),
            cleanup_on_startup: false,
            ..ScratchConfig::default()
        },
        detect_language: false,
        ..LensConfig::default()
    };
    let mut model = AppModel::new(config).unwrap();
    let id = model.documents.open(doc_path.to_path_buf()).unwrap();
    (model, id)
}

/// Write `content` to a new file named `name` in `dir`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Full text of a document in the model
pub fn doc_text(model: &AppModel, id: DocumentId) -> String {
    use escape_lens::model::DocumentAccess;
    model.documents.get(id).unwrap().text()
}

/// Scratch content as the store sees it
pub fn scratch_text(store: &dyn ScratchStore, id: escape_lens::scratch::ScratchId) -> String {
    store.read(id).unwrap()
}
