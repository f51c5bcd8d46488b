use std::path::PathBuf;

use thiserror::Error;

/// Longhand's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Longhand's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad chunk length, bad duration, or otherwise invalid job configuration.
    /// Always reported before any recognition work begins.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The input file is missing, unreadable, or undecodable.
    #[error("source unreadable: {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// Every attempted chunk failed recognition, so the job as a whole failed.
    ///
    /// Individual chunk failures are not fatal on their own; they are collected
    /// into the run outcome so a rerun can retry exactly those chunks.
    #[error("recognition failed for all attempted chunks: {failed_chunks:?}")]
    RecognitionFailure { failed_chunks: Vec<usize> },

    /// The requested output format identifier is not one we support.
    #[error("unsupported output format: {0:?}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

impl Error {
    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn source_unreadable(
        path: impl Into<PathBuf>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}
