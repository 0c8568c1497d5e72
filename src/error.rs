/// Dashtable Errors
///
/// The table pipeline is total and never fails. Errors only come from the
/// edges: reading files, decoding JSON, talking to the backend, bad config.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[cfg(feature = "client")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
