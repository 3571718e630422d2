//! Embeddable core library for podlink.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a dependency manager or other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits:
//! - [`LibrarySource`](ports::LibrarySource) loads library descriptors
//! - [`WritePort`](ports::WritePort) writes report artifacts
//! - [`ProjectStore`] opens and saves user projects
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_integrate`](pipeline::run_integrate) integrates every library and builds a report
//! - [`run_status`](pipeline::run_status) reports integration state without writing

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export so embedders don't need podlink-project directly.
pub use podlink_project::{FsProjectStore, InMemoryProjectStore, ProjectStore};
