//! Error types for graph construction, ranking, and score write-back.

use std::path::PathBuf;

use thiserror::Error;

/// Every fatal condition the ranking core can report.
///
/// Failing to converge is not represented here: it is a normal terminal
/// state surfaced through [`crate::pagerank::PageRankResult::converged`].
#[derive(Debug, Error)]
pub enum RankError {
    /// A solver parameter is outside its admissible range.
    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfiguration { field: String, message: String },

    /// The starting rank vector is unusable (non-finite, negative, or the
    /// wrong length).
    #[error("invalid initial rank state: {0}")]
    InvalidInitialState(String),

    /// A record has no node in the graph it is being scored against.
    #[error("no graph index for record url \"{url}\"")]
    MissingIndex { url: String },

    /// The rank vector does not cover the graph it was computed for.
    #[error("rank vector has {actual} entries but the graph has {expected} nodes")]
    RankLengthMismatch { expected: usize, actual: usize },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankError {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        RankError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
