use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes one generated pod library and the consumer project it links into.
///
/// Produced by whatever resolves the dependency graph; podlink only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTarget {
    /// Display name of the library file reference once integrated, e.g. `libPods.a`.
    pub product_name: String,

    /// Static-library product label, e.g. `Pods`.
    pub label: String,

    /// Project file of the consumer.
    pub user_project_path: Utf8PathBuf,

    /// Identifiers of the consumer targets that should link the library.
    #[serde(default)]
    pub user_target_uuids: Vec<String>,

    pub xcconfig_path: Utf8PathBuf,

    /// `xcconfig_path` relative to the consumer project directory.
    pub xcconfig_relative_path: String,

    pub copy_resources_script_relative_path: String,

    /// Build settings defined by the generated xcconfig.
    #[serde(default)]
    pub xcconfig_attributes: BTreeMap<String, String>,
}

impl IntegrationTarget {
    /// File name of the static library built for `label`.
    pub fn library_file_name(&self) -> String {
        format!("lib{}.a", self.label)
    }

    /// `user_target_uuids` with duplicates removed, first occurrence wins.
    pub fn unique_target_uuids(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.user_target_uuids
            .iter()
            .map(String::as_str)
            .filter(|uuid| seen.insert(*uuid))
            .collect()
    }
}
