use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::notify::Operation;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} model must be a JSON object")]
    NotAnObject(&'static str),
    #[error("Preset not found: {0}")]
    PresetNotFound(String),
    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("{operation} failed: {message}")]
    Collaborator { operation: Operation, message: String },
}

impl BackendError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackendError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
