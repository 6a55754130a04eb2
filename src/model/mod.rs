//! Application model - the complete state of the tool
//!
//! Documents, the edit coordinator, and the collaborators it works against,
//! following the Elm Architecture pattern.

pub mod document;

pub use document::{Document, DocumentAccess, DocumentId};

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::LensConfig;
use crate::error::EditError;
use crate::scratch::{FileScratchStore, ScratchStore};
use crate::session::EditCoordinator;
use crate::syntax::{HeuristicDetector, LanguageDetector, NoDetection};

/// Open documents keyed by id
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<DocumentId, Document>,
    next_id: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, assigning it an id
    pub fn insert(&mut self, mut document: Document) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        document.id = Some(id);
        self.documents.insert(id, document);
        id
    }

    /// Load a file and add it
    pub fn open(&mut self, path: PathBuf) -> Result<DocumentId, std::io::Error> {
        let document = Document::from_file(path)?;
        tracing::debug!("Opened {}", document.display_name());
        Ok(self.insert(document))
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Like [`get`](Self::get) but failing with [`EditError::UnknownDocument`]
    pub fn require(&self, id: DocumentId) -> Result<&Document, EditError> {
        self.get(id).ok_or(EditError::UnknownDocument(id))
    }

    pub fn require_mut(&mut self, id: DocumentId) -> Result<&mut Document, EditError> {
        self.get_mut(id).ok_or(EditError::UnknownDocument(id))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// The complete application model
pub struct AppModel {
    pub documents: DocumentStore,
    pub coordinator: EditCoordinator,
    pub scratch: Box<dyn ScratchStore>,
    pub detector: Box<dyn LanguageDetector>,
    pub config: LensConfig,
}

impl std::fmt::Debug for AppModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppModel")
            .field("documents", &self.documents)
            .field("coordinator", &self.coordinator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppModel {
    /// Assemble a model from explicit collaborators
    pub fn with_parts(
        config: LensConfig,
        scratch: Box<dyn ScratchStore>,
        detector: Box<dyn LanguageDetector>,
    ) -> Self {
        Self {
            documents: DocumentStore::new(),
            coordinator: EditCoordinator::new(config.default_style),
            scratch,
            detector,
            config,
        }
    }

    /// Model backed by on-disk scratch files, as configured
    pub fn new(config: LensConfig) -> Result<Self, EditError> {
        let store = match &config.scratch.directory {
            Some(dir) => FileScratchStore::new(dir.clone())?,
            None => FileScratchStore::in_temp_dir()?,
        };
        if config.scratch.cleanup_on_startup {
            store.cleanup_stale(config.scratch.stale_after());
        }

        let detector: Box<dyn LanguageDetector> = if config.detect_language {
            Box::new(HeuristicDetector::new())
        } else {
            Box::new(NoDetection)
        };

        Ok(Self::with_parts(config, Box::new(store), detector))
    }
}
