//! Port traits abstracting all I/O away from the pipeline.
//!
//! Project documents go through [`podlink_project::ProjectStore`].

use camino::{Utf8Path, Utf8PathBuf};
use podlink_types::library::IntegrationTarget;

/// A library descriptor together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedLibrary {
    pub path: Utf8PathBuf,
    pub library: IntegrationTarget,
}

/// Source of library descriptors, in the order they must be integrated.
pub trait LibrarySource {
    fn load_libraries(&self) -> anyhow::Result<Vec<LoadedLibrary>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
