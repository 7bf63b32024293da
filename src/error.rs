use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The state file could not be stat'd, created, read or written.
    #[error("Cannot access state file {}: {source}", path.display())]
    StorageAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The state file is non-empty but not a valid window document.
    #[error("Malformed window state: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("Failed to encode window state: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Bind failure or the listener stopping on its own.
    #[error("Listener error: {0}")]
    Listener(#[source] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot install interrupt handler: {0}")]
    Signal(#[source] ctrlc::Error),
}

impl Error {
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::StorageAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
