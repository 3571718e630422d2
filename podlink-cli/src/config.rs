//! Configuration file loading for podlink.
//!
//! Discovers and loads `podlink.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "podlink.toml";

pub const DEFAULT_DESCRIPTORS_DIR: &str = "Pods/Integration";
pub const DEFAULT_OUT_DIR: &str = "Pods/Integration/report";

/// Top-level configuration from podlink.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PodlinkConfig {
    /// Where descriptors are read and artifacts written.
    pub integration: IntegrationConfig,

    /// How override warnings affect the exit code.
    pub warnings: WarningsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Directory holding library descriptors, relative to the project root.
    pub descriptors_dir: Utf8PathBuf,

    /// Directory receiving report artifacts, relative to the project root.
    pub out_dir: Utf8PathBuf,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            descriptors_dir: Utf8PathBuf::from(DEFAULT_DESCRIPTORS_DIR),
            out_dir: Utf8PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarningsConfig {
    /// Exit with code 2 when any override warning is raised.
    pub fail_on_warnings: bool,
}

/// Discover the podlink.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a podlink.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PodlinkConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<PodlinkConfig> {
    let config: PodlinkConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return the default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<PodlinkConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(PodlinkConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub descriptors_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub fail_on_warnings: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PodlinkConfig,
}

impl ConfigMerger {
    pub fn new(config: PodlinkConfig) -> Self {
        Self { config }
    }

    /// Merge with integrate command CLI arguments.
    ///
    /// Explicit CLI directories replace the config file values; the
    /// `--fail-on-warnings` flag can only switch the policy on.
    pub fn merge_integrate_args(
        self,
        cli_descriptors_dir: Option<Utf8PathBuf>,
        cli_out_dir: Option<Utf8PathBuf>,
        cli_fail_on_warnings: bool,
    ) -> MergedConfig {
        MergedConfig {
            descriptors_dir: cli_descriptors_dir.unwrap_or(self.config.integration.descriptors_dir),
            out_dir: cli_out_dir.unwrap_or(self.config.integration.out_dir),
            fail_on_warnings: cli_fail_on_warnings || self.config.warnings.fail_on_warnings,
        }
    }

    /// Merge with status command CLI arguments.
    pub fn merge_status_args(self, cli_descriptors_dir: Option<Utf8PathBuf>) -> MergedConfig {
        self.merge_integrate_args(cli_descriptors_dir, None, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[integration]
descriptors_dir = "Build/Pods"
out_dir = "Build/podlink"

[warnings]
fail_on_warnings = true
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.integration.descriptors_dir, "Build/Pods");
        assert_eq!(config.integration.out_dir, "Build/podlink");
        assert!(config.warnings.fail_on_warnings);
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let contents = r#"
[integration]
descriptors_dir = "Build/Pods"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.integration.descriptors_dir, "Build/Pods");
        assert_eq!(config.integration.out_dir, DEFAULT_OUT_DIR);
        assert!(!config.warnings.fail_on_warnings);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.integration.descriptors_dir, DEFAULT_DESCRIPTORS_DIR);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_config("[integration]\ndescriptor_dir = \"x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = PodlinkConfig {
            integration: IntegrationConfig {
                descriptors_dir: Utf8PathBuf::from("config/descriptors"),
                out_dir: Utf8PathBuf::from("config/out"),
            },
            warnings: WarningsConfig {
                fail_on_warnings: false,
            },
        };

        let merged = ConfigMerger::new(config).merge_integrate_args(
            Some(Utf8PathBuf::from("cli/descriptors")),
            None,
            true,
        );

        assert_eq!(merged.descriptors_dir, "cli/descriptors");
        assert_eq!(merged.out_dir, "config/out");
        assert!(merged.fail_on_warnings);
    }

    #[test]
    fn test_config_policy_survives_absent_flag() {
        let config = PodlinkConfig {
            warnings: WarningsConfig {
                fail_on_warnings: true,
            },
            ..Default::default()
        };
        let merged = ConfigMerger::new(config).merge_integrate_args(None, None, false);
        assert!(merged.fail_on_warnings);
    }

    #[test]
    fn test_load_or_default() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

        let config = load_or_default(&root).unwrap();
        assert_eq!(config.integration.out_dir, DEFAULT_OUT_DIR);

        std::fs::write(
            root.join(CONFIG_FILE_NAME),
            "[integration]\nout_dir = \"reports\"\n",
        )
        .unwrap();
        let config = load_or_default(&root).unwrap();
        assert_eq!(config.integration.out_dir, "reports");
    }
}
