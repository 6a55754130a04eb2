//! Scratch resources: the editable copies handed to the user during an edit
//!
//! The coordinator only creates, reads, and deletes scratch resources.
//! Naming and placement belong to the store implementation.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::ScratchError;
use crate::syntax::LanguageId;

/// File name prefix shared by every scratch file this crate creates
pub const SCRATCH_PREFIX: &str = "escape-lens-";

/// Identifies one scratch resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScratchId(pub u64);

impl fmt::Display for ScratchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Create/read/delete access to scratch resources
pub trait ScratchStore {
    fn create(&mut self, content: &str, language: LanguageId) -> Result<ScratchId, ScratchError>;

    fn read(&self, id: ScratchId) -> Result<String, ScratchError>;

    fn delete(&mut self, id: ScratchId) -> Result<(), ScratchError>;

    /// On-disk location, for stores that have one
    fn path(&self, id: ScratchId) -> Option<&Path> {
        let _ = id;
        None
    }
}

/// Scratch files on disk, one per edit session
///
/// Files are created with `tempfile` and persisted so an external editor
/// can open them; `delete` removes them.
#[derive(Debug)]
pub struct FileScratchStore {
    dir: PathBuf,
    files: HashMap<ScratchId, PathBuf>,
    next_id: u64,
}

impl FileScratchStore {
    /// Store scratch files in `dir` (created if missing)
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ScratchError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ScratchError::io(&dir, e))?;
        Ok(Self {
            dir,
            files: HashMap::new(),
            next_id: 1,
        })
    }

    /// Store scratch files in the system temp directory
    pub fn in_temp_dir() -> Result<Self, ScratchError> {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove scratch files left behind by earlier runs
    ///
    /// Only files carrying [`SCRATCH_PREFIX`] that this store does not track
    /// and that were last modified more than `max_age` ago are touched. A
    /// younger file may belong to an edit running in another process.
    /// Returns how many were removed.
    pub fn cleanup_stale(&self, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to scan {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        let mut removed = 0;
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            let is_scratch = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(SCRATCH_PREFIX))
                .unwrap_or(false);
            if !is_scratch || !path.is_file() || self.files.values().any(|p| *p == path) {
                continue;
            }
            if !older_than(&path, max_age) {
                tracing::debug!("Keeping recent scratch {}", path.display());
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove stale {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            tracing::info!("Removed {} stale scratch files from {}", removed, self.dir.display());
        }
        removed
    }

    fn lookup(&self, id: ScratchId) -> Result<&PathBuf, ScratchError> {
        self.files.get(&id).ok_or(ScratchError::Unknown(id))
    }
}

/// Unreadable timestamps count as recent
fn older_than(path: &Path, max_age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > max_age)
}

impl ScratchStore for FileScratchStore {
    fn create(&mut self, content: &str, language: LanguageId) -> Result<ScratchId, ScratchError> {
        use std::io::Write;

        let suffix = format!(".{}", language.extension());
        let mut file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| ScratchError::io(&self.dir, e))?;

        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| ScratchError::io(file.path(), e))?;

        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| ScratchError::io(e.path.to_path_buf(), e.error))?;

        let id = ScratchId(self.next_id);
        self.next_id += 1;
        tracing::debug!("Created scratch {} at {}", id, path.display());
        self.files.insert(id, path);
        Ok(id)
    }

    fn read(&self, id: ScratchId) -> Result<String, ScratchError> {
        let path = self.lookup(id)?;
        fs::read_to_string(path).map_err(|e| ScratchError::io(path, e))
    }

    fn delete(&mut self, id: ScratchId) -> Result<(), ScratchError> {
        let path = self.files.remove(&id).ok_or(ScratchError::Unknown(id))?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted scratch {} at {}", id, path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScratchError::io(path, e)),
        }
    }

    fn path(&self, id: ScratchId) -> Option<&Path> {
        self.files.get(&id).map(PathBuf::as_path)
    }
}

/// In-memory scratch store for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryScratchStore {
    contents: HashMap<ScratchId, String>,
    next_id: u64,
}

impl MemoryScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user editing the scratch copy
    pub fn write(&mut self, id: ScratchId, content: &str) -> Result<(), ScratchError> {
        let slot = self.contents.get_mut(&id).ok_or(ScratchError::Unknown(id))?;
        *slot = content.to_string();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl ScratchStore for MemoryScratchStore {
    fn create(&mut self, content: &str, _language: LanguageId) -> Result<ScratchId, ScratchError> {
        self.next_id += 1;
        let id = ScratchId(self.next_id);
        self.contents.insert(id, content.to_string());
        Ok(id)
    }

    fn read(&self, id: ScratchId) -> Result<String, ScratchError> {
        self.contents
            .get(&id)
            .cloned()
            .ok_or(ScratchError::Unknown(id))
    }

    fn delete(&mut self, id: ScratchId) -> Result<(), ScratchError> {
        self.contents
            .remove(&id)
            .map(|_| ())
            .ok_or(ScratchError::Unknown(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileScratchStore::new(dir.path()).unwrap();

        let id = store.create("line1\nline2", LanguageId::Json).unwrap();
        let path = store.path(id).unwrap().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .starts_with(SCRATCH_PREFIX));
        assert_eq!(store.read(id).unwrap(), "line1\nline2");

        std::fs::write(&path, "edited").unwrap();
        assert_eq!(store.read(id).unwrap(), "edited");

        store.delete(id).unwrap();
        assert!(!path.exists());
        assert!(matches!(store.read(id), Err(ScratchError::Unknown(_))));
    }

    #[test]
    fn test_read_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileScratchStore::new(dir.path()).unwrap();
        let id = store.create("x", LanguageId::PlainText).unwrap();
        let path = store.path(id).unwrap().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        let err = store.read(id).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
        // Already gone on disk is not an error for delete
        store.delete(id).unwrap();
    }

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn backdate(path: &Path, by: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn test_cleanup_stale_skips_tracked_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("escape-lens-old.txt");
        std::fs::write(&old, "stale").unwrap();
        backdate(&old, 2 * DAY);
        let unrelated = dir.path().join("unrelated.txt");
        std::fs::write(&unrelated, "keep").unwrap();
        backdate(&unrelated, 2 * DAY);

        let mut store = FileScratchStore::new(dir.path()).unwrap();
        let live = store.create("live", LanguageId::PlainText).unwrap();
        backdate(store.path(live).unwrap(), 2 * DAY);

        assert_eq!(store.cleanup_stale(DAY), 1);
        assert!(!old.exists());
        assert!(unrelated.exists());
        assert!(store.path(live).unwrap().exists());
    }

    #[test]
    fn test_cleanup_stale_keeps_recent_scratch_of_other_process() {
        let dir = tempfile::tempdir().unwrap();

        // Another running edit owns this one
        let mut other = FileScratchStore::new(dir.path()).unwrap();
        let busy = other.create("in progress", LanguageId::PlainText).unwrap();

        let store = FileScratchStore::new(dir.path()).unwrap();
        assert_eq!(store.cleanup_stale(DAY), 0);
        assert_eq!(other.read(busy).unwrap(), "in progress");
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryScratchStore::new();
        let id = store.create("a", LanguageId::PlainText).unwrap();
        store.write(id, "b").unwrap();
        assert_eq!(store.read(id).unwrap(), "b");
        assert_eq!(store.len(), 1);
        store.delete(id).unwrap();
        assert!(store.is_empty());
        assert!(store.delete(id).is_err());
    }
}
