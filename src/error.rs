//! Error types for docx2md operations.

use thiserror::Error;

/// Errors that can occur while loading or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Block not found: {0}")]
    MissingBlock(String),

    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("No snapshot for document {0}")]
    SnapshotNotFound(String),

    #[error("Chapter link cycles back to {0}")]
    ChapterCycle(String),
}

pub type Result<T> = std::result::Result<T, Error>;
