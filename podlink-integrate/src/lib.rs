//! Integration engine for podlink.
//!
//! Responsibilities:
//! - Resolve which declared targets still need a library.
//! - Attach the xcconfig, link the static library and add the script phases.
//! - Warn about target build settings that shadow the xcconfig.
//! - Save the project once per library, or render a patch on dry runs.

mod error;
mod integrator;
pub mod inspect;
pub mod overrides;
mod patch;
pub mod phases;

pub use error::{IntegrateError, IntegrateResult};
pub use integrator::{IntegrateOptions, IntegrationOutcome, TargetIntegrator, TargetRef, is_integrated};
pub use inspect::{TargetState, TargetStatus, inspect, inspect_library};
pub use overrides::detect_overrides;
pub use patch::render_patch;
