//! Ports for loading and persisting project documents.

use crate::document::ProjectDocument;
use crate::error::{ProjectError, ProjectResult};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use tracing::debug;

/// File inside an `.xcodeproj` bundle that holds the object graph.
pub const PROJECT_FILE_NAME: &str = "project.pbxproj";

/// Opens and saves project documents.
///
/// Every `open` reads the current persisted state; implementations must not
/// hand out a cached document, because another integrator may have saved the
/// same project since.
pub trait ProjectStore {
    fn open(&self, path: &Utf8Path) -> ProjectResult<ProjectDocument>;

    fn save(&self, path: &Utf8Path, document: &ProjectDocument) -> ProjectResult<()>;
}

/// File-system backed `ProjectStore`.
///
/// Relative paths resolve against `root`; a path naming an `.xcodeproj`
/// bundle resolves to the `project.pbxproj` inside it.
#[derive(Debug, Clone)]
pub struct FsProjectStore {
    root: Utf8PathBuf,
}

impl FsProjectStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The file actually read and written for `path`.
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        if abs.extension() == Some("xcodeproj") {
            abs.join(PROJECT_FILE_NAME)
        } else {
            abs
        }
    }
}

impl ProjectStore for FsProjectStore {
    fn open(&self, path: &Utf8Path) -> ProjectResult<ProjectDocument> {
        let file = self.resolve(path);
        debug!(path = %file, "opening project");
        let contents = fs::read_to_string(&file).map_err(|source| ProjectError::Read {
            path: file.clone(),
            source,
        })?;
        ProjectDocument::parse(&file, &contents)
    }

    /// Writes a sibling temp file and renames it over the project, so readers
    /// never observe a half-written document.
    fn save(&self, path: &Utf8Path, document: &ProjectDocument) -> ProjectResult<()> {
        let file = self.resolve(path);
        let contents = document.to_json()?;
        let tmp = Utf8PathBuf::from(format!("{file}.podlink.tmp"));
        debug!(path = %file, bytes = contents.len(), "saving project");

        let write_err = |source| ProjectError::Write {
            path: file.clone(),
            source,
        };
        fs::write(&tmp, contents.as_bytes()).map_err(write_err)?;
        fs::rename(&tmp, &file).map_err(write_err)
    }
}

/// In-memory `ProjectStore` for embedding and testing.
///
/// Holds serialized documents, so `open` always parses a fresh copy, and
/// counts successful saves.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    files: RefCell<BTreeMap<Utf8PathBuf, String>>,
    saves: Cell<usize>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<Utf8PathBuf>, document: &ProjectDocument) -> ProjectResult<()> {
        let contents = document.to_json()?;
        self.files.borrow_mut().insert(path.into(), contents);
        Ok(())
    }

    pub fn insert_raw(&self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), contents.into());
    }

    /// Serialized contents currently stored at `path`.
    pub fn contents(&self, path: &Utf8Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn open(&self, path: &Utf8Path) -> ProjectResult<ProjectDocument> {
        let contents = self.contents(path).ok_or_else(|| ProjectError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such project"),
        })?;
        ProjectDocument::parse(path, &contents)
    }

    fn save(&self, path: &Utf8Path, document: &ProjectDocument) -> ProjectResult<()> {
        let contents = document.to_json()?;
        self.files.borrow_mut().insert(path.to_path_buf(), contents);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_store_resolves_xcodeproj_bundle() {
        let store = FsProjectStore::new(Utf8PathBuf::from("/repo"));
        assert_eq!(
            store.resolve(Utf8Path::new("App.xcodeproj")),
            Utf8PathBuf::from("/repo/App.xcodeproj/project.pbxproj")
        );
        assert_eq!(
            store.resolve(Utf8Path::new("/abs/other.json")),
            Utf8PathBuf::from("/abs/other.json")
        );
    }

    #[test]
    fn fs_store_round_trips_document() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::create_dir_all(root.join("App.xcodeproj")).expect("mkdir");

        let mut doc = ProjectDocument::new();
        doc.new_native_target("App", &["Debug"]).expect("target");

        let store = FsProjectStore::new(root.clone());
        store
            .save(Utf8Path::new("App.xcodeproj"), &doc)
            .expect("save");
        assert!(root.join("App.xcodeproj/project.pbxproj").exists());
        assert!(!root.join("App.xcodeproj/project.pbxproj.podlink.tmp").exists());

        let reopened = store.open(Utf8Path::new("App.xcodeproj")).expect("open");
        assert_eq!(reopened.to_json().expect("json"), doc.to_json().expect("json"));
    }

    #[test]
    fn fs_store_reports_missing_project() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let err = FsProjectStore::new(root)
            .open(Utf8Path::new("Missing.xcodeproj"))
            .expect_err("missing");
        assert!(matches!(err, ProjectError::Read { .. }));
    }

    #[test]
    fn in_memory_store_counts_saves_and_reparses() {
        let store = InMemoryProjectStore::new();
        let path = Utf8Path::new("App.xcodeproj");
        store.insert(path, &ProjectDocument::new()).expect("insert");

        let mut doc = store.open(path).expect("open");
        doc.new_native_target("App", &["Debug"]).expect("target");
        assert!(store.open(path).expect("open").targets().is_empty());

        store.save(path, &doc).expect("save");
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.open(path).expect("open").targets().len(), 1);
    }

    #[test]
    fn in_memory_store_reports_parse_errors() {
        let store = InMemoryProjectStore::new();
        store.insert_raw("bad.xcodeproj", "{ not json");
        let err = store
            .open(Utf8Path::new("bad.xcodeproj"))
            .expect_err("parse");
        assert!(matches!(err, ProjectError::Parse { .. }));
    }
}
