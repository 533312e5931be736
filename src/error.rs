use std::path::PathBuf;

/// Failures at the crate boundary: reading inputs and decoding schema documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No SQL statement given")]
    MissingSql,
}
