/// Error types shared across the application
use std::path::PathBuf;
use thiserror::Error;

/// A file could not be classified.
///
/// Every failure of the stat, header read or dimension probe ends up here,
/// carrying the offending path and the underlying cause.
#[derive(Debug, Error)]
#[error("classification failed at {}: {source}", .path.display())]
pub struct ClassifyError {
    pub path: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ClassifyError {
    pub fn new<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Not a supported image: {}", .0.display())]
    NotMedia(PathBuf),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
