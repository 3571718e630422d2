use serde::{Deserialize, Serialize};

/// The fixed mutation steps applied to a pending target, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStep {
    BaseConfiguration,
    LibraryReference,
    CopyResourcesPhase,
    CheckManifestPhase,
}

impl IntegrationStep {
    pub const ORDERED: [IntegrationStep; 4] = [
        IntegrationStep::BaseConfiguration,
        IntegrationStep::LibraryReference,
        IntegrationStep::CopyResourcesPhase,
        IntegrationStep::CheckManifestPhase,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IntegrationStep::BaseConfiguration => "set xcconfig as base configuration",
            IntegrationStep::LibraryReference => "link static library",
            IntegrationStep::CopyResourcesPhase => "add copy resources build phase",
            IntegrationStep::CheckManifestPhase => "add manifest check build phase",
        }
    }
}

/// Progress events emitted by one integration, for an external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IntegrationEvent {
    /// Opens the integration of one library; only emitted when work is pending.
    Section {
        library: String,
        project_path: String,
        target_count: u64,
        targets: Vec<String>,
    },
    StepCompleted {
        step: IntegrationStep,
        targets: Vec<String>,
    },
    Saved {
        project_path: String,
    },
}
