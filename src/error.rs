//! Error types for the mailru_dl crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a mirror run.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to decode API response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Invalid share link: {0}")]
    InvalidShareLink(String),

    #[error("Unsafe entry name: {0:?}")]
    UnsafeName(String),

    #[error("Dispatcher returned no download URL")]
    MissingDownloadUrl,

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path:?}: {source}")]
    CreateFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for MirrorError.
pub type Result<T> = std::result::Result<T, MirrorError>;
