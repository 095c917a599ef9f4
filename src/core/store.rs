use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

/// Trait for artifact storage - a directory, a remote endpoint, or memory
pub trait ArtifactStore {
    /// Fetch a document by identifier. Missing documents are `artifact.not_found`.
    fn read(&self, id: &str) -> Result<String>;
    /// Persist a document under an identifier.
    fn write(&self, id: &str, content: &str) -> Result<()>;
    /// Short label used in errors and reports, e.g. `dir:./temp`.
    fn describe(&self) -> String;
}

/// One file per identifier inside a directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    overwrite: bool,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: false,
        }
    }

    /// Allow writes to replace existing artifacts.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

/// Pull the underlying cause out of an `internal.io_error`.
fn io_cause(err: &Error) -> String {
    err.details
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| err.message.clone())
}

impl ArtifactStore for LocalStore {
    fn read(&self, id: &str) -> Result<String> {
        let path = self.path_for(id);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::artifact_not_found(id, self.describe())
            } else {
                Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
            }
        })
    }

    fn write(&self, id: &str, content: &str) -> Result<()> {
        let path = self.path_for(id);

        if !self.overwrite && path.exists() {
            return Err(Error::artifact_write_conflict(id, self.describe()));
        }

        io::write_file_atomic(&path, content, "write artifact")
            .map_err(|e| Error::artifact_write_failed(id, self.describe(), io_cause(&e)))
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// In-memory store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<BTreeMap<String, String>>,
    writes: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.documents.borrow_mut().extend(
            documents
                .into_iter()
                .map(|(id, content)| (id.into(), content.into())),
        );
        store
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.documents.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.borrow().is_empty()
    }

    /// Identifiers in the order they were written, repeats included.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn into_documents(self) -> BTreeMap<String, String> {
        self.documents.into_inner()
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, id: &str) -> Result<String> {
        self.get(id)
            .ok_or_else(|| Error::artifact_not_found(id, self.describe()))
    }

    fn write(&self, id: &str, content: &str) -> Result<()> {
        self.documents
            .borrow_mut()
            .insert(id.to_string(), content.to_string());
        self.writes.borrow_mut().push(id.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn local_store_write_read() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store.write("dev_report", "<search/>").unwrap();
        assert_eq!(store.read("dev_report").unwrap(), "<search/>");
        assert!(dir.path().join("dev_report").is_file());
    }

    #[test]
    fn local_store_missing_artifact_is_not_found() {
        let dir = tempdir().unwrap();
        let err = LocalStore::new(dir.path()).read("prod_missing").unwrap_err();
        assert_eq!(err.code.as_str(), "artifact.not_found");
        assert_eq!(err.details["id"], "prod_missing");
    }

    #[test]
    fn local_store_rejects_overwrite_by_default() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store.write("dev_a", "one").unwrap();
        let err = store.write("dev_a", "two").unwrap_err();
        assert_eq!(err.code.as_str(), "artifact.write_conflict");
        assert_eq!(store.read("dev_a").unwrap(), "one");
    }

    #[test]
    fn local_store_overwrites_when_enabled() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).with_overwrite(true);

        store.write("dev_a", "one").unwrap();
        store.write("dev_a", "two").unwrap();
        assert_eq!(store.read("dev_a").unwrap(), "two");
    }

    #[test]
    fn local_store_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("missing"));

        let err = store.write("dev_a", "content").unwrap_err();
        assert_eq!(err.code.as_str(), "artifact.write_failed");
        assert!(err.details["error"].as_str().is_some());
    }

    #[test]
    fn memory_store_tracks_repeated_writes() {
        let store = MemoryStore::with_documents([("prod_a", "x")]);
        store.write("dev_a", "1").unwrap();
        store.write("dev_a", "2").unwrap();

        assert_eq!(store.writes(), vec!["dev_a", "dev_a"]);
        assert_eq!(store.get("dev_a").as_deref(), Some("2"));
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.read("nope").unwrap_err().code.as_str(),
            "artifact.not_found"
        );
    }
}
