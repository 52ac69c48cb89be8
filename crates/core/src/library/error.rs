//! Error types for the library module.

use std::path::PathBuf;
use thiserror::Error;

use crate::heuristics::HeuristicError;

/// Errors that can occur while filing an entry into the library.
///
/// None of these are retried: a job that fails here is quarantined.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Entry claims no files.
    #[error("entry has no files (number of files: {number_of_files})")]
    NoFiles { number_of_files: i64 },

    /// Content path does not exist.
    #[error("content path doesn't exist: {path}")]
    ContentMissing { path: PathBuf },

    /// Movie content without a video file.
    #[error("no video files found in {path}")]
    NoVideo { path: PathBuf },

    /// Movie content with several candidate video files.
    #[error("found {} video files but can only handle one: {files:?}", files.len())]
    AmbiguousVideo { files: Vec<PathBuf> },

    /// Single-episode entry with more than one file.
    #[error("expected a single file, entry has {number_of_files}")]
    TooManyFiles { number_of_files: i64 },

    /// Season entry with fewer than two files.
    #[error("need at least 2 files, entry has {number_of_files}")]
    TooFewFiles { number_of_files: i64 },

    /// Show/season/episode could not be derived from a name.
    #[error(transparent)]
    Heuristic(#[from] HeuristicError),

    /// Destination already exists. Library content is never overwritten.
    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Failed to create a show directory.
    #[error("failed to create dir {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a file.
    #[error("failed to copy file from {from} to {to}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem failure, with the path involved.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    /// Creates a copy failed error.
    pub fn copy_failed(from: PathBuf, to: PathBuf, source: std::io::Error) -> Self {
        Self::CopyFailed { from, to, source }
    }

    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
