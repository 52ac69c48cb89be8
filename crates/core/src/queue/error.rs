//! Error types for the queue module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the work queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Work directory is missing or unreadable.
    #[error("invalid work path '{path}'")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Work path exists but is not a directory.
    #[error("work path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Listing the work directory failed.
    #[error("failed to read dir '{path}'")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a job file failed.
    #[error("failed to read '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Job file is not a valid entry. Possibly still being written.
    #[error("failed to parse JSON from '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Job file name disagrees with its content. Skipped for the rest of the run.
    #[error("file '{path}' should actually be named '{expected}' based on the contents")]
    Poisoned { path: PathBuf, expected: PathBuf },

    /// Entry could not be serialized.
    #[error("failed to serialize entry")]
    Serialize(#[source] serde_json::Error),

    /// A job with the same hash is already queued.
    #[error("job file already exists: '{path}'")]
    AlreadyExists { path: PathBuf },

    /// Writing a new job file failed.
    #[error("failed to write file '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deleting a finished job file failed.
    #[error("failed to remove file '{path}'")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QueueError {
    /// Whether waiting and reading again may succeed.
    ///
    /// Only unparseable job files qualify: the producer may still be writing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Whether the job was memoized as processed when this error was raised.
    pub fn is_poisoned(&self) -> bool {
        matches!(self, Self::Poisoned { .. })
    }
}
