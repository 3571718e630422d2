//! Detection of target build settings that shadow the generated xcconfig.
//!
//! Once the xcconfig is attached as a base configuration, any value a target
//! sets directly for the same key wins over it. That is only harmless when the
//! target value pulls the base value back in through `$(inherited)`.

use podlink_project::SettingValue;
use podlink_project::object::BuildConfiguration;
use podlink_types::diagnostic::{Diagnostic, Severity, codes};
use std::collections::BTreeMap;

/// Token that makes a target setting include the value of its base configuration.
pub const INHERITED_MARKER: &str = "$(inherited)";

/// One library attribute shadowed in one or more build configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideConflict {
    pub key: String,
    /// Offending configuration names, in the order the target lists them.
    pub configurations: Vec<String>,
}

/// True when a target value for an xcconfig key discards the xcconfig value.
pub fn is_override(value: Option<&SettingValue>) -> bool {
    value.is_some_and(|v| !v.is_empty() && !v.contains(INHERITED_MARKER))
}

/// Collects shadowed attributes across `configurations`, one entry per key,
/// keys in sorted order.
pub fn find_overrides<'c>(
    attributes: &BTreeMap<String, String>,
    configurations: impl IntoIterator<Item = &'c BuildConfiguration>,
) -> Vec<OverrideConflict> {
    let mut by_key: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for config in configurations {
        for key in attributes.keys() {
            if is_override(config.build_settings.get(key)) {
                by_key
                    .entry(key.as_str())
                    .or_default()
                    .push(config.name.clone());
            }
        }
    }

    by_key
        .into_iter()
        .map(|(key, configurations)| OverrideConflict {
            key: key.to_string(),
            configurations,
        })
        .collect()
}

/// Converts a conflict into the warning shown to the user.
pub fn override_diagnostic(
    target_name: &str,
    xcconfig_relative_path: &str,
    conflict: &OverrideConflict,
) -> Diagnostic {
    let key = &conflict.key;
    let configs = conflict
        .configurations
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if conflict.configurations.len() == 1 {
        "build configuration"
    } else {
        "build configurations"
    };

    Diagnostic {
        severity: Severity::Warning,
        code: codes::XCCONFIG_OVERRIDE.to_string(),
        message: format!(
            "The target `{target_name}` overrides the `{key}` build setting defined in \
             `{xcconfig_relative_path}` for the {configs} {noun}. \
             This can lead to problems with the pod library integration."
        ),
        suggested_actions: vec![
            format!("Add `{INHERITED_MARKER}` to the `{key}` build setting of `{target_name}`."),
            format!("Remove the `{key}` build setting from `{target_name}`."),
        ],
        target: Some(target_name.to_string()),
        key: Some(key.clone()),
        configurations: conflict.configurations.clone(),
    }
}

/// Runs detection for one target and renders each conflict as a diagnostic.
pub fn detect_overrides<'c>(
    target_name: &str,
    configurations: impl IntoIterator<Item = &'c BuildConfiguration>,
    attributes: &BTreeMap<String, String>,
    xcconfig_relative_path: &str,
) -> Vec<Diagnostic> {
    find_overrides(attributes, configurations)
        .iter()
        .map(|conflict| override_diagnostic(target_name, xcconfig_relative_path, conflict))
        .collect()
}
