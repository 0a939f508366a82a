// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every failure the data pipeline can report, as one enum.
//
//   Io                   — unreadable input / unwritable output
//   Parse                — malformed corpus record or pair table row
//   MissingUtterance     — a conversation references an unknown line id
//   ArtifactNotFound     — persisted Field/Vocab path does not exist
//   ArtifactCorrupt      — artifact exists but has the wrong shape
//   IncompatibleArtifact — artifact written by another format version
//   InvalidConfig        — a configuration value is out of range
//   UnknownId            — an id outside the vocabulary was decoded
//
// All of them are fatal. Sequences longer than fix_length are not
// an error: they are truncated and counted by the dataset.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the data and infra layers.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in '{path}' line {line}: {message}")]
    Parse {
        path:    PathBuf,
        line:    usize,
        message: String,
    },

    #[error("conversation {conversation} references unknown utterance '{line_id}'")]
    MissingUtterance {
        conversation: usize,
        line_id:      String,
    },

    #[error("artifact not found: '{0}'")]
    ArtifactNotFound(PathBuf),

    #[error("artifact '{path}' is corrupt: {message}")]
    ArtifactCorrupt {
        path:    PathBuf,
        message: String,
    },

    #[error("artifact '{path}' has format version {found}, expected {expected}")]
    IncompatibleArtifact {
        path:     PathBuf,
        found:    u32,
        expected: u32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("token id {0} is outside the vocabulary")]
    UnknownId(u32),
}

impl PipelineError {
    /// Wrap an `std::io::Error` together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io { path: path.into(), source }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::InvalidConfig(message.into())
    }
}
