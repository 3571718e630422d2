use serde::{Deserialize, Serialize};

/// Stable diagnostic codes.
pub mod codes {
    /// A target build setting shadows a setting of the generated xcconfig.
    pub const XCCONFIG_OVERRIDE: &str = "xcconfig_override";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// A user-actionable, non-fatal finding raised while integrating.
///
/// Rendering is left to the caller; `message` is plain text and each entry of
/// `suggested_actions` is one remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,

    /// Name of the consumer target concerned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Build setting key concerned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Build configurations concerned, in project order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configurations: Vec<String>,
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
