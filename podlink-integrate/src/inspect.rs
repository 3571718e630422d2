//! Read-only view of how far a library is integrated.

use crate::error::IntegrateResult;
use crate::integrator::is_integrated;
use podlink_project::{ProjectDocument, ProjectStore};
use podlink_types::library::IntegrationTarget;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Integrated,
    Pending,
    /// The identifier does not name a native target of the project.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub state: TargetState,
}

/// Classifies each declared target without mutating anything. Missing targets
/// are reported rather than failing the whole inspection.
pub fn inspect(doc: &ProjectDocument, library: &IntegrationTarget) -> Vec<TargetStatus> {
    library
        .unique_target_uuids()
        .into_iter()
        .map(|uuid| match doc.native_target(uuid) {
            None => TargetStatus {
                uuid: uuid.to_string(),
                name: None,
                state: TargetState::Missing,
            },
            Some(target) => TargetStatus {
                uuid: uuid.to_string(),
                name: Some(target.name.clone()),
                state: if is_integrated(doc, uuid, &library.product_name) {
                    TargetState::Integrated
                } else {
                    TargetState::Pending
                },
            },
        })
        .collect()
}

/// Opens the library's project through `store` and inspects it.
pub fn inspect_library(
    store: &dyn ProjectStore,
    library: &IntegrationTarget,
) -> IntegrateResult<Vec<TargetStatus>> {
    let doc = store.open(&library.user_project_path)?;
    Ok(inspect(&doc, library))
}
