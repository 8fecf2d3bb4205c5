//! Error type shared by every `nav-*` crate.
//!
//! Loader failures and query failures use the same enum so a caller can match
//! on the kind (`MissingInput`, `CorruptData`, …) no matter which layer
//! produced it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing input {}: {reason}", path.display())]
    MissingInput { path: PathBuf, reason: &'static str },

    #[error("corrupt data in {}: {reason}", path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what:  &'static str,
        index: usize,
        len:   usize,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DataError::CorruptData { path: path.into(), reason: reason.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io { path: path.into(), source }
    }

    /// Map an open/read failure: `NotFound` becomes `MissingInput`, anything
    /// else stays an I/O error.
    pub fn from_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DataError::MissingInput { path, reason: "file does not exist" }
        } else {
            DataError::Io { path, source }
        }
    }
}

/// Shorthand result type for all `nav-*` crates.
pub type DataResult<T> = Result<T, DataError>;
