//! Clap-free settings for the integrate and status pipelines.

use camino::{Utf8Path, Utf8PathBuf};

/// Settings for the integrate pipeline.
#[derive(Debug, Clone)]
pub struct IntegrateSettings {
    /// Directory that project paths in descriptors are relative to.
    pub project_root: Utf8PathBuf,
    pub descriptors_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    pub dry_run: bool,
    /// Treat override warnings as a policy block (exit 2).
    pub fail_on_warnings: bool,
}

impl Default for IntegrateSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            descriptors_dir: Utf8PathBuf::from("Pods/Integration"),
            out_dir: Utf8PathBuf::from("Pods/Integration/report"),
            dry_run: false,
            fail_on_warnings: false,
        }
    }
}

impl IntegrateSettings {
    pub fn resolved_descriptors_dir(&self) -> Utf8PathBuf {
        resolve(&self.project_root, &self.descriptors_dir)
    }

    pub fn resolved_out_dir(&self) -> Utf8PathBuf {
        resolve(&self.project_root, &self.out_dir)
    }
}

/// Absolute paths win; relative ones hang off the project root.
pub fn resolve(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
