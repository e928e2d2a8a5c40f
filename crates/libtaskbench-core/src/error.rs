//! Error types for taskbench

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("failed to write {}: {}", .path.display(), .source)]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {}", .path.display(), .source)]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for BenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BenchError::WorkerPanicked(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
