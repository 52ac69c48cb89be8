//! Driver types.

use std::time::Duration;

use thiserror::Error;

use crate::library::ProcessError;
use crate::queue::QueueError;

/// Why the driver stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Cancellation was requested.
    Cancelled,
    /// The configured number of jobs was processed.
    LimitReached,
}

/// Summary of a driver run that ended cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome {
    pub stop: StopReason,
    /// Jobs processed successfully.
    pub processed: u64,
    /// Time spent in backoff sleeps that ran to completion.
    pub total_backoff: Duration,
}

/// Errors that end a driver run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Retryable queue errors persisted past the retry cap.
    #[error("failed to get next work entry: exceeded {max} retries")]
    RetriesExceeded {
        max: i32,
        #[source]
        source: QueueError,
    },

    /// Non-retryable queue error, including poisoned jobs.
    #[error("failed to get next work entry")]
    Queue(#[source] QueueError),

    /// Processing failed. The job was ignored, not removed.
    #[error("failed to process entry {hash}, ignoring until restart")]
    Processing {
        hash: String,
        #[source]
        source: ProcessError,
    },

    /// The job succeeded but could not be removed from the queue.
    #[error("failed to remove entry {hash}")]
    Complete {
        hash: String,
        #[source]
        source: QueueError,
    },
}
