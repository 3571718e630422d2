//! Error types for podlink-project.

use crate::object::ObjectId;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Failure to open, interpret, or persist a project document.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("read project {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write project {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse project {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize project")]
    Serialize(#[source] serde_json::Error),

    /// The document parsed but its object graph is unusable.
    #[error("invalid project {path}: {reason}")]
    Invalid { path: Utf8PathBuf, reason: String },

    #[error("object {id} is missing or is not a {expected}")]
    UnexpectedObject { id: ObjectId, expected: &'static str },
}

pub type ProjectResult<T> = Result<T, ProjectError>;
