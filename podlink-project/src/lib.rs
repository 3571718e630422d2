//! Xcode project document model for podlink.
//!
//! The object graph lives in an arena keyed by [`ObjectId`]; objects refer to
//! each other by identifier only. Documents are exchanged with storage through
//! the [`ProjectStore`] port, which always yields a freshly read copy.
//!
//! On disk a project is the JSON form of the pbxproj object graph
//! (`archiveVersion`, `objectVersion`, `rootObject`, `objects`). Keys and
//! object kinds the model does not know about are carried through unchanged.

mod document;
mod error;
pub mod object;
mod store;

pub use document::{FRAMEWORKS_GROUP_NAME, ProjectDocument};
pub use error::{ProjectError, ProjectResult};
pub use object::{Object, ObjectId, RawObject, SettingValue};
pub use store::{FsProjectStore, InMemoryProjectStore, PROJECT_FILE_NAME, ProjectStore};
