//! Default filesystem-backed port implementations.

use crate::ports::{LibrarySource, LoadedLibrary, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use podlink_types::library::IntegrationTarget;
use tracing::debug;

/// Descriptor file extensions, in the order they are scanned.
const DESCRIPTOR_PATTERNS: [&str; 3] = ["*.json", "*.yaml", "*.yml"];

/// Loads every descriptor directly inside `descriptors_dir`.
///
/// Subdirectories (such as the report output directory) are not scanned.
#[derive(Debug, Clone)]
pub struct FsLibrarySource {
    pub descriptors_dir: Utf8PathBuf,
}

impl FsLibrarySource {
    pub fn new(descriptors_dir: Utf8PathBuf) -> Self {
        Self { descriptors_dir }
    }
}

impl LibrarySource for FsLibrarySource {
    fn load_libraries(&self) -> anyhow::Result<Vec<LoadedLibrary>> {
        let mut out = Vec::new();
        for pattern in DESCRIPTOR_PATTERNS {
            let pattern = self.descriptors_dir.join(pattern);
            debug!(pattern = %pattern, "scanning for library descriptors");

            for entry in glob(pattern.as_str()).with_context(|| format!("glob {}", pattern))? {
                let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
                let path = Utf8PathBuf::from_path_buf(path)
                    .map_err(|p| anyhow::anyhow!("non UTF-8 descriptor path: {}", p.display()))?;
                let library = load_descriptor(&path)?;
                out.push(LoadedLibrary { path, library });
            }
        }

        // Deterministic order matters: libraries are integrated in this order.
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }
}

/// Parses a JSON or YAML descriptor, picked by file extension.
pub fn load_descriptor(path: &Utf8Path) -> anyhow::Result<IntegrationTarget> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    match path.extension() {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&contents).with_context(|| format!("parse YAML descriptor {}", path))
        }
        _ => serde_json::from_str(&contents).with_context(|| format!("parse JSON descriptor {}", path)),
    }
}

/// In-memory library source for embedding and testing.
///
/// Sorts by path on construction to match `FsLibrarySource`'s ordering.
#[derive(Debug, Clone)]
pub struct InMemoryLibrarySource {
    libraries: Vec<LoadedLibrary>,
}

impl InMemoryLibrarySource {
    pub fn new(mut libraries: Vec<LoadedLibrary>) -> Self {
        libraries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { libraries }
    }
}

impl LibrarySource for InMemoryLibrarySource {
    fn load_libraries(&self) -> anyhow::Result<Vec<LoadedLibrary>> {
        Ok(self.libraries.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON: &str = r#"{
        "product_name": "libPods.a",
        "label": "Pods",
        "user_project_path": "App.xcodeproj",
        "user_target_uuids": ["AAAAAAAAAAAAAAAAAAAAAAAA"],
        "xcconfig_path": "Pods/Pods.xcconfig",
        "xcconfig_relative_path": "Pods/Pods.xcconfig",
        "copy_resources_script_relative_path": "Pods/Pods-resources.sh"
    }"#;

    const YAML: &str = "product_name: libTools.a
label: Tools
user_project_path: App.xcodeproj
user_target_uuids:
  - BBBBBBBBBBBBBBBBBBBBBBBB
xcconfig_path: Pods/Tools.xcconfig
xcconfig_relative_path: Pods/Tools.xcconfig
copy_resources_script_relative_path: Pods/Tools-resources.sh
xcconfig_attributes:
  OTHER_LDFLAGS: -ObjC
";

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    #[test]
    fn fs_source_loads_json_and_yaml_sorted_by_path() {
        let (_temp, root) = temp_dir();
        std::fs::write(root.join("b-tools.yml"), YAML).expect("write");
        std::fs::write(root.join("a-pods.json"), JSON).expect("write");
        std::fs::write(root.join("notes.txt"), "ignored").expect("write");
        std::fs::create_dir_all(root.join("report")).expect("mkdir");
        std::fs::write(root.join("report/report.json"), "{}").expect("write");

        let loaded = FsLibrarySource::new(root.clone())
            .load_libraries()
            .expect("load");

        let names: Vec<&str> = loaded.iter().map(|l| l.library.product_name.as_str()).collect();
        assert_eq!(names, vec!["libPods.a", "libTools.a"]);
        assert_eq!(loaded[1].library.xcconfig_attributes["OTHER_LDFLAGS"], "-ObjC");
    }

    #[test]
    fn fs_source_reports_malformed_descriptor() {
        let (_temp, root) = temp_dir();
        std::fs::write(root.join("broken.json"), "{ not json").expect("write");

        let err = FsLibrarySource::new(root)
            .load_libraries()
            .expect_err("malformed");
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn fs_source_on_missing_dir_is_empty() {
        let (_temp, root) = temp_dir();
        let loaded = FsLibrarySource::new(root.join("missing"))
            .load_libraries()
            .expect("load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn in_memory_source_sorts_by_path() {
        let library: IntegrationTarget = serde_json::from_str(JSON).expect("parse");
        let source = InMemoryLibrarySource::new(vec![
            LoadedLibrary {
                path: Utf8PathBuf::from("z.json"),
                library: library.clone(),
            },
            LoadedLibrary {
                path: Utf8PathBuf::from("a.json"),
                library,
            },
        ]);
        let paths: Vec<String> = source
            .load_libraries()
            .expect("load")
            .into_iter()
            .map(|l| l.path.to_string())
            .collect();
        assert_eq!(paths, vec!["a.json", "z.json"]);
    }

    #[test]
    fn fs_write_port_creates_parents() {
        let (_temp, root) = temp_dir();
        let file = root.join("a/b/report.json");
        FsWritePort.write_file(&file, b"{}").expect("write");
        assert_eq!(std::fs::read_to_string(file).expect("read"), "{}");
    }
}
