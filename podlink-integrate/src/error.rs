//! Error types for podlink-integrate.
//!
//! Both variants are fatal for the library being integrated. Override
//! conflicts are not errors; they surface as diagnostics.

use camino::Utf8PathBuf;
use podlink_project::ProjectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrateError {
    /// A declared target identifier does not name a native target of the
    /// project. The descriptor and the project on disk disagree.
    #[error(
        "unable to find the integration target `{uuid}` for library `{library}` in project \
         `{project}`; the project may have been changed since the library was generated"
    )]
    MissingTarget {
        uuid: String,
        library: String,
        project: Utf8PathBuf,
    },

    /// The project could not be opened, interpreted, or saved.
    #[error(transparent)]
    Project(#[from] ProjectError),
}

impl IntegrateError {
    pub fn is_missing_target(&self) -> bool {
        matches!(self, IntegrateError::MissingTarget { .. })
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

pub type IntegrateResult<T> = Result<T, IntegrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_names_uuid_and_library() {
        let err = IntegrateError::MissingTarget {
            uuid: "DEADBEEF".to_string(),
            library: "libPods.a".to_string(),
            project: Utf8PathBuf::from("App.xcodeproj"),
        };
        let msg = err.to_string();
        assert!(err.is_missing_target());
        assert!(msg.contains("DEADBEEF"));
        assert!(msg.contains("libPods.a"));
        assert!(msg.contains("App.xcodeproj"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn project_error_is_transparent() {
        let inner = ProjectError::Invalid {
            path: Utf8PathBuf::from("App.xcodeproj"),
            reason: "no root".to_string(),
        };
        let expected = inner.to_string();
        let err = IntegrateError::from(inner);
        assert!(!err.is_missing_target());
        assert_eq!(err.to_string(), expected);
    }
}
