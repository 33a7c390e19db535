use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid entity data for {id}: {reason}")]
    InvalidEntityData { id: String, reason: String },

    #[error("dataset contains no entities")]
    EmptyDataset,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidEntityData {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
