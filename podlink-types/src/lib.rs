//! Shared DTOs (schemas-as-code) for the podlink workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod diagnostic;
pub mod event;
pub mod library;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const PODLINK_REPORT_V1: &str = "podlink.report.v1";
    pub const PODLINK_LIBRARY_V1: &str = "podlink.library.v1";
}
