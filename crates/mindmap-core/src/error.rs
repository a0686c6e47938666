//! Error taxonomy for diagram operations

use crate::model::Notice;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    /// Malformed persisted document or catalog; nothing was changed.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("a node with id \"{0}\" already exists")]
    DuplicateNode(String),

    #[error("node \"{0}\" is protected")]
    ProtectedNode(String),

    #[error("no node with id \"{0}\"")]
    UnknownNode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = DiagramError> = std::result::Result<T, E>;

impl From<&DiagramError> for Notice {
    fn from(err: &DiagramError) -> Self {
        match err {
            DiagramError::DuplicateNode(_) | DiagramError::ProtectedNode(_) => {
                Notice::warning(err.to_string())
            }
            _ => Notice::error(err.to_string()),
        }
    }
}
